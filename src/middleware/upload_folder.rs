use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Sub-folder of the upload root that a route's files are written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadFolder(pub &'static str);

impl UploadFolder {
    pub const PRODUCTS: UploadFolder = UploadFolder("products");
}

impl Default for UploadFolder {
    fn default() -> Self {
        UploadFolder("others")
    }
}

/// Tags the request with its upload folder before the multipart handler runs.
pub async fn set_upload_folder(
    State(folder): State<UploadFolder>,
    mut req: Request,
    next: Next,
) -> Response {
    req.extensions_mut().insert(folder);
    next.run(req).await
}

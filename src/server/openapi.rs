//! OpenAPI document and the pages that render it.

use axum::Json;
use axum::response::Html;
use utoipa::OpenApi;

use super::error::{ErrorDetail, ErrorResponse};
use super::routes;
use crate::types::{ClassificationResult, ClassifyRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tag Classifier API",
        description = "Zero-shot classification of tag lists into caller-supplied categories"
    ),
    paths(routes::health, routes::info, routes::classify),
    components(schemas(ClassifyRequest, ClassificationResult, ErrorResponse, ErrorDetail)),
    tags(
        (name = "Health", description = "Liveness and service information"),
        (name = "Classification", description = "Tag classification"),
    )
)]
pub struct ApiDoc;

/// Path the documentation pages load the document from.
pub const OPENAPI_JSON_PATH: &str = "/openapi.json";

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Tag Classifier API</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui", deepLinking: true });
        };
    </script>
</body>
</html>"##,
    )
}

pub async fn redoc() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Tag Classifier API</title>
</head>
<body>
    <redoc spec-url="/openapi.json"></redoc>
    <script src="https://cdn.redoc.ly/redoc/latest/bundles/redoc.standalone.js"></script>
</body>
</html>"#,
    )
}

//! OpenAPI documentation
//!
//! Serves a hand-maintained OpenAPI 3.0 document and a Swagger UI page.

use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

/// Create OpenAPI routes
pub fn create_openapi_routes() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(swagger_ui))
}

/// OpenAPI JSON specification endpoint
async fn openapi_json() -> impl IntoResponse {
    Json(get_openapi_spec())
}

/// Swagger UI HTML endpoint
async fn swagger_ui() -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

fn json_response(description: &str, schema: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": { "schema": schema }
        }
    })
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn id_parameter(description: &str) -> Value {
    json!({
        "name": "id",
        "in": "path",
        "required": true,
        "description": description,
        "schema": { "type": "integer", "format": "int64" }
    })
}

/// Get the OpenAPI specification as JSON
pub fn get_openapi_spec() -> Value {
    let unauthorized = json!({ "description": "Missing or unknown API key" });
    let forbidden = json!({ "description": "Caller may not access this resource" });
    let not_found = json!({ "description": "Not found" });

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "mailsink API",
            "description": "Administrative API of the mailsink development SMTP sink.\n\n## Authentication\n\n- **Header**: `X-API-Key: <key>`\n- **Bearer**: `Authorization: Bearer <key>`\n\nThe configured admin token grants access to every endpoint. A project API key grants access to that project's emails only.",
            "version": env!("CARGO_PKG_VERSION"),
            "license": {
                "name": "Apache-2.0",
                "url": "https://www.apache.org/licenses/LICENSE-2.0"
            }
        },
        "tags": [
            {"name": "health", "description": "Health check endpoints"},
            {"name": "projects", "description": "Project management"},
            {"name": "emails", "description": "Captured emails"},
            {"name": "stats", "description": "Database statistics"}
        ],
        "security": [{ "ApiKey": [] }, { "Bearer": [] }],
        "paths": {
            "/health": {
                "get": {
                    "tags": ["health"],
                    "summary": "Basic health check",
                    "operationId": "health",
                    "security": [],
                    "responses": {
                        "200": json_response("Service is healthy", schema_ref("HealthResponse"))
                    }
                }
            },
            "/health/live": {
                "get": {
                    "tags": ["health"],
                    "summary": "Liveness check",
                    "operationId": "liveness",
                    "security": [],
                    "responses": { "200": { "description": "Process is running" } }
                }
            },
            "/health/ready": {
                "get": {
                    "tags": ["health"],
                    "summary": "Readiness check",
                    "operationId": "readiness",
                    "security": [],
                    "responses": {
                        "200": { "description": "Database reachable" },
                        "503": { "description": "Database unavailable" }
                    }
                }
            },
            "/api/v1/stats": {
                "get": {
                    "tags": ["stats"],
                    "summary": "Project and email counts (admin)",
                    "operationId": "getStats",
                    "responses": {
                        "200": json_response("Counts", schema_ref("StatsResponse")),
                        "401": unauthorized,
                        "403": forbidden
                    }
                }
            },
            "/api/v1/projects": {
                "get": {
                    "tags": ["projects"],
                    "summary": "List projects (admin)",
                    "operationId": "listProjects",
                    "responses": {
                        "200": json_response("Projects", json!({
                            "type": "array",
                            "items": schema_ref("Project")
                        })),
                        "401": unauthorized,
                        "403": forbidden
                    }
                },
                "post": {
                    "tags": ["projects"],
                    "summary": "Create a project (admin)",
                    "operationId": "createProject",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": { "schema": schema_ref("CreateProject") }
                        }
                    },
                    "responses": {
                        "201": json_response("Project created, API key included", schema_ref("Project")),
                        "401": unauthorized,
                        "403": forbidden,
                        "409": json_response("SMTP user already taken", schema_ref("Error")),
                        "422": json_response("Empty field", schema_ref("Error"))
                    }
                }
            },
            "/api/v1/projects/{id}": {
                "get": {
                    "tags": ["projects"],
                    "summary": "Get a project",
                    "operationId": "getProject",
                    "parameters": [id_parameter("Project ID")],
                    "responses": {
                        "200": json_response("Project", schema_ref("Project")),
                        "401": unauthorized,
                        "403": forbidden,
                        "404": not_found
                    }
                },
                "delete": {
                    "tags": ["projects"],
                    "summary": "Delete a project and its emails (admin)",
                    "operationId": "deleteProject",
                    "parameters": [id_parameter("Project ID")],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "401": unauthorized,
                        "403": forbidden,
                        "404": not_found
                    }
                }
            },
            "/api/v1/projects/{id}/emails": {
                "delete": {
                    "tags": ["emails"],
                    "summary": "Delete every email of a project",
                    "operationId": "purgeProjectEmails",
                    "parameters": [id_parameter("Project ID")],
                    "responses": {
                        "200": json_response("Purged", schema_ref("PurgeResponse")),
                        "401": unauthorized,
                        "403": forbidden,
                        "404": not_found
                    }
                }
            },
            "/api/v1/emails": {
                "get": {
                    "tags": ["emails"],
                    "summary": "List emails, newest first",
                    "operationId": "listEmails",
                    "parameters": [
                        {
                            "name": "project_id",
                            "in": "query",
                            "description": "Restrict to one project (implied for project keys)",
                            "schema": { "type": "integer", "format": "int64" }
                        },
                        {
                            "name": "limit",
                            "in": "query",
                            "schema": { "type": "integer", "default": 50, "minimum": 1, "maximum": 500 }
                        },
                        {
                            "name": "offset",
                            "in": "query",
                            "schema": { "type": "integer", "default": 0, "minimum": 0 }
                        }
                    ],
                    "responses": {
                        "200": json_response("Emails", schema_ref("EmailList")),
                        "401": unauthorized,
                        "403": forbidden
                    }
                }
            },
            "/api/v1/emails/{id}": {
                "get": {
                    "tags": ["emails"],
                    "summary": "Get an email with its raw text",
                    "operationId": "getEmail",
                    "parameters": [id_parameter("Email ID")],
                    "responses": {
                        "200": json_response("Email", schema_ref("Email")),
                        "401": unauthorized,
                        "403": forbidden,
                        "404": not_found
                    }
                },
                "delete": {
                    "tags": ["emails"],
                    "summary": "Delete an email",
                    "operationId": "deleteEmail",
                    "parameters": [id_parameter("Email ID")],
                    "responses": {
                        "204": { "description": "Deleted" },
                        "401": unauthorized,
                        "403": forbidden,
                        "404": not_found
                    }
                }
            }
        },
        "components": {
            "securitySchemes": {
                "ApiKey": { "type": "apiKey", "in": "header", "name": "X-API-Key" },
                "Bearer": { "type": "http", "scheme": "bearer" }
            },
            "schemas": {
                "HealthResponse": {
                    "type": "object",
                    "properties": { "status": { "type": "string", "example": "healthy" } }
                },
                "Error": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "object",
                            "properties": {
                                "code": { "type": "string", "example": "NOT_FOUND" },
                                "message": { "type": "string" }
                            }
                        }
                    }
                },
                "CreateProject": {
                    "type": "object",
                    "required": ["name", "smtp_user", "smtp_pass"],
                    "properties": {
                        "name": { "type": "string" },
                        "smtp_user": { "type": "string" },
                        "smtp_pass": { "type": "string" }
                    }
                },
                "Project": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "name": { "type": "string" },
                        "api_key": { "type": "string" },
                        "smtp_user": { "type": "string" },
                        "smtp_pass": { "type": "string" },
                        "created_at": { "type": "string", "format": "date-time" }
                    }
                },
                "EmailSummary": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int64" },
                        "project_id": { "type": "integer", "format": "int64" },
                        "from_address": { "type": "string" },
                        "to_addresses": { "type": "array", "items": { "type": "string" } },
                        "subject": { "type": "string" },
                        "received_at": { "type": "string", "format": "date-time" }
                    }
                },
                "Email": {
                    "allOf": [
                        schema_ref("EmailSummary"),
                        {
                            "type": "object",
                            "properties": {
                                "body": { "type": "string" },
                                "raw": { "type": "string" }
                            }
                        }
                    ]
                },
                "EmailList": {
                    "type": "object",
                    "properties": {
                        "data": { "type": "array", "items": schema_ref("EmailSummary") },
                        "total": { "type": "integer" },
                        "limit": { "type": "integer" },
                        "offset": { "type": "integer" }
                    }
                },
                "PurgeResponse": {
                    "type": "object",
                    "properties": {
                        "project_id": { "type": "integer", "format": "int64" },
                        "deleted": { "type": "integer" }
                    }
                },
                "StatsResponse": {
                    "type": "object",
                    "properties": {
                        "projects": { "type": "integer" },
                        "emails": { "type": "integer" },
                        "per_project": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "integer", "format": "int64" },
                                    "name": { "type": "string" },
                                    "emails": { "type": "integer" }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

const SWAGGER_UI_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>mailsink API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5.9.0/swagger-ui-bundle.js"></script>
    <script>
        window.onload = function() {
            SwaggerUIBundle({ url: "/openapi.json", dom_id: '#swagger-ui' });
        };
    </script>
</body>
</html>"#;

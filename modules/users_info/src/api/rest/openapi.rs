use utoipa::OpenApi;

use crate::api::rest::{dto, handlers};
use modkit::api::problem::Problem;

/// OpenAPI document for the users endpoints.
#[derive(OpenApi)]
#[openapi(
    info(title = "Users API", description = "CRUD over user records"),
    paths(
        handlers::list_users,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user
    ),
    components(schemas(dto::UserDto, dto::CreateUserReq, dto::UpdateUserReq, Problem)),
    tags((name = "users", description = "User records"))
)]
pub struct ApiDoc;

/// The users OpenAPI document.
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_users_path() {
        let doc = openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/api/users".to_string()));
        assert!(paths.contains(&"/api/users/{id}".to_string()));

        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("UserDto"));
        assert!(schemas.contains_key("Problem"));
    }
}

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
}

//! `/api/v1/skills` handlers.
//!
//! Every request builds its own registry from the configured roots and only
//! queries it, so concurrent requests never share mutable skill state.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tessera_core::{Role, TesseraError};
use tessera_skills::{
    HelperFile, NewSkill, ParseOptions, SkillDescriptor, SkillRegistry, ValidationReport,
    DEFAULT_VERSION,
};
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// `all` (default), `developer`, or `user`.
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ForceParams {
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub role_restriction: Option<String>,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub skill_md_body: String,
}

fn default_version() -> String {
    DEFAULT_VERSION.into()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillListItem {
    pub name: String,
    pub description: String,
    pub version: String,
    pub role_restriction: Option<String>,
    pub path: String,
}

impl From<&SkillDescriptor> for SkillListItem {
    fn from(s: &SkillDescriptor) -> Self {
        Self {
            name: s.name.clone(),
            description: s.description.clone(),
            version: s.version.clone(),
            role_restriction: s.role_restriction.clone(),
            path: s.path.display().to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillResponse {
    pub name: String,
    pub description: String,
    pub version: String,
    pub role_restriction: Option<String>,
    pub allowed_tools: Vec<String>,
    pub path: String,
    pub skill_md_content: String,
    pub helper_files: Vec<HelperFile>,
}

impl From<&SkillDescriptor> for SkillResponse {
    fn from(s: &SkillDescriptor) -> Self {
        Self {
            name: s.name.clone(),
            description: s.description.clone(),
            version: s.version.clone(),
            role_restriction: s.role_restriction.clone(),
            allowed_tools: s.allowed_tools.clone(),
            path: s.path.display().to_string(),
            skill_md_content: std::fs::read_to_string(s.skill_file()).unwrap_or_default(),
            helper_files: s.helper_files(),
        }
    }
}

fn registry(state: &AppState) -> SkillRegistry {
    SkillRegistry::from_roots(&state.skills.roots())
}

fn find(registry: &SkillRegistry, name: &str) -> ApiResult<SkillDescriptor> {
    registry
        .get(name)
        .cloned()
        .ok_or_else(|| TesseraError::SkillNotFound(name.to_string()).into())
}

pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<SkillListItem>>> {
    let registry = registry(&state);
    let items: Vec<SkillListItem> = match params.role.as_deref() {
        None | Some("all") | Some("") => registry.iter().map(SkillListItem::from).collect(),
        Some(role) => {
            let role: Role = role.parse()?;
            registry
                .visible_to(role)
                .into_iter()
                .map(SkillListItem::from)
                .collect()
        }
    };
    Ok(Json(items))
}

pub async fn get_skill(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<SkillResponse>> {
    let skill = find(&registry(&state), &name)?;
    Ok(Json(SkillResponse::from(&skill)))
}

pub async fn create_skill(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSkillRequest>,
) -> ApiResult<(StatusCode, Json<SkillResponse>)> {
    let new_skill = NewSkill {
        name: req.name,
        description: req.description,
        role_restriction: req.role_restriction,
        allowed_tools: req.allowed_tools,
        version: req.version,
        body: req.skill_md_body,
    };
    let dir = tessera_skills::create_skill(&state.skills.user_dir, &new_skill)?;

    let mut registry = registry(&state);
    let skill = registry.register(&dir)?;
    Ok((StatusCode::CREATED, Json(SkillResponse::from(&skill))))
}

pub async fn delete_skill(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    tessera_skills::delete_skill(
        &state.skills.user_dir,
        state.skills.builtin_dir.as_deref(),
        &name,
    )?;
    Ok(Json(json!({ "deleted": name })))
}

pub async fn validate_skill(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<ValidationReport> {
    // Looking the skill up must not repair the file being validated.
    let registry = SkillRegistry::from_roots_with(&state.skills.roots(), ParseOptions::READ_ONLY);
    let report = match registry.get(&name) {
        Some(skill) => tessera_skills::validate_skill_dir(&skill.path),
        None => ValidationReport {
            valid: false,
            errors: vec![TesseraError::SkillNotFound(name).to_string()],
            warnings: Vec::new(),
        },
    };
    Json(report)
}

pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<HelperFile>>> {
    let skill = find(&registry(&state), &name)?;
    Ok(Json(skill.helper_files()))
}

pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path((name, file)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let skill = find(&registry(&state), &name)?;
    let bytes = tessera_skills::read_helper_file(&skill, &file)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    ))
}

pub async fn put_file(
    State(state): State<Arc<AppState>>,
    Path((name, file)): Path<(String, String)>,
    Query(params): Query<ForceParams>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let skill = find(&registry(&state), &name)?;
    tessera_skills::write_helper_file(&skill, &file, &body, params.force)?;
    info!(skill = %name, file = %file, bytes = body.len(), "uploaded helper file");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "uploaded": file, "size_bytes": body.len() })),
    ))
}

pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((name, file)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let skill = find(&registry(&state), &name)?;
    tessera_skills::remove_helper_file(&skill, &file)?;
    Ok(Json(json!({ "deleted": file })))
}

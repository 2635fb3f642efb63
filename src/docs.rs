use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Map, Value};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::diary;
use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
	paths(
		routes::auth::login,
		routes::auth::logout,
		routes::auth::current_session,
		routes::teams::list_teams,
		routes::teams::team_details,
		routes::teams::update_approval,
		routes::teams::assign_mentor,
		routes::projects::list_projects,
		routes::projects::project_details,
		routes::projects::approve_mentors,
		routes::projects::approve_hod,
		routes::reviews::list_reviews,
		routes::reviews::update_review,
		routes::reviews::list_templates,
		routes::reviews::create_template,
		routes::schedules::list_schedules,
		routes::schedules::create_schedule,
		routes::logs::approve_log,
		routes::logs::pending_logs,
		routes::logs::student_logs,
		routes::logs::students_with_logs,
		routes::staff::create_staff,
		routes::staff::available_staff,
		routes::diary::generate_diary,
		routes::health::health
	),
	components(
		schemas(
			models::staff::Staff,
			models::staff::AvailableStaff,
			models::staff::StaffCreateRequest,
			models::staff::StaffCreateResponse,
			models::staff::LoginRequest,
			models::staff::LoginResponse,
			models::student::Student,
			models::team::Team,
			models::team::TeamSummary,
			models::team::TeamListResponse,
			models::team::TeamDetailResponse,
			models::team::UpdateApprovalRequest,
			models::team::AssignMentorRequest,
			models::team::TeamMutationResponse,
			models::project::Project,
			models::project::ProjectSummary,
			models::project::ProjectListResponse,
			models::project::ProjectDetailResponse,
			models::project::ProjectApprovalRequest,
			models::project::ProjectMutationResponse,
			models::review::Review,
			models::review::ReviewAttachment,
			models::review::ReviewTemplate,
			models::review::ReviewSummary,
			models::review::ReviewListResponse,
			models::review::ReviewUpdateRequest,
			models::review::ReviewMutationResponse,
			models::review::TemplateCreateRequest,
			models::review::TemplateCreateResponse,
			models::review::TemplateListResponse,
			models::schedule::Schedule,
			models::schedule::ScheduleListResponse,
			models::schedule::ScheduleCreateRequest,
			models::schedule::ScheduleCreateResponse,
			models::log::Log,
			models::log::PendingLog,
			models::log::StudentLog,
			models::log::PendingLogsResponse,
			models::log::StudentLogsResponse,
			models::log::StudentListResponse,
			models::log::LogApproveRequest,
			models::log::LogMutationResponse,
			diary::DiaryData,
			diary::DiarySection,
			diary::DiaryHeader,
			diary::DiaryDocument,
			routes::auth::MessageResponse,
			routes::auth::SessionInfo,
			routes::auth::SessionResponse,
			routes::staff::AvailableStaffResponse,
			routes::diary::DiaryGenerateRequest,
			routes::diary::DiaryResponse,
			routes::health::HealthResponse
		)
	),
	tags(
		(name = "Auth", description = "Session management"),
		(name = "Teams", description = "Team approval and mentor assignment"),
		(name = "Projects", description = "Project approval chain"),
		(name = "Reviews", description = "Review evaluation and templates"),
		(name = "Schedules", description = "Review scheduling"),
		(name = "Logs", description = "Student activity-log approval"),
		(name = "Staff", description = "Staff accounts"),
		(name = "Diary", description = "Project diary generation"),
		(name = "Health", description = "Service health")
	)
)]
pub struct ApiDoc;

pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
	let mut doc = serde_json::to_value(&ApiDoc::openapi())?;

	ensure_security_components(&mut doc);
	ensure_openapi_version(&mut doc);
	ensure_servers(&mut doc, port);

	Ok(serde_json::from_value(doc)?)
}

pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> Router {
	let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
		.try_it_out_enabled(true)
		.with_credentials(true);

	let doc_json = Arc::new(serde_json::to_value(&doc).expect("OpenAPI serialization must succeed"));

	let json_route = {
		let doc_json = Arc::clone(&doc_json);
		get(move || {
			let doc_json = Arc::clone(&doc_json);
			async move { Json((*doc_json).clone()) }
		})
	};

	Router::new()
		.route("/api-docs/openapi.json", json_route)
		.merge(SwaggerUi::new("/docs").config(swagger_config))
}

fn ensure_security_components(doc: &mut Value) {
	let components = doc
		.as_object_mut()
		.expect("OpenAPI root must be an object")
		.entry("components")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
		.expect("components must be an object");

	let schemes = components
		.entry("securitySchemes")
		.or_insert_with(|| Value::Object(Map::new()))
		.as_object_mut()
		.expect("securitySchemes must be an object");

	// The portal authenticates with the http-only session cookie.
	schemes.insert(
		"sessionCookie".to_string(),
		json!({
			"type": "apiKey",
			"in": "cookie",
			"name": "session"
		}),
	);
}

fn ensure_openapi_version(doc: &mut Value) {
	doc
		.as_object_mut()
		.expect("OpenAPI root must be an object")
		.entry("openapi")
		.or_insert_with(|| Value::String("3.1.0".to_string()));
}

fn ensure_servers(doc: &mut Value, port: u16) {
	let server_url = format!("http://localhost:{}", port);

	match doc.get_mut("servers") {
		Some(Value::Array(arr)) => {
			let has = arr
				.iter()
				.any(|v| v.get("url").and_then(Value::as_str) == Some(server_url.as_str()));
			if !has {
				arr.push(json!({ "url": server_url }));
			}
		}
		_ => {
			doc["servers"] = json!([{ "url": server_url }]);
		}
	}
}

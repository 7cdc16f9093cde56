pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::state::AppState;
use crate::{admin, auth, cv, interview, jobs, linkedin, stats};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // CV builder
        .route(
            "/api/cv/save-section",
            post(cv::handlers::handle_save_section),
        )
        .route("/api/cv/get", get(cv::handlers::handle_get_cv))
        .route("/api/cv/health", get(cv::handlers::handle_cv_health))
        .route("/api/cv/render", get(cv::handlers::handle_render_cv))
        .route("/api/cv/export", get(cv::handlers::handle_export_markdown))
        .route("/api/cv/summary", post(cv::handlers::handle_generate_summary))
        // Dashboard stats and roadmap
        .route("/api/stats", get(stats::handlers::handle_get_stats))
        .route(
            "/api/stats/activity",
            post(stats::handlers::handle_log_activity),
        )
        .route(
            "/api/roadmap",
            get(stats::handlers::handle_get_roadmap).post(stats::handlers::handle_save_roadmap),
        )
        // LinkedIn import
        .route(
            "/api/linkedin/import",
            post(linkedin::handlers::handle_import),
        )
        // Job application tracker
        .route(
            "/api/applications",
            get(jobs::handlers::handle_list_applications)
                .post(jobs::handlers::handle_create_application),
        )
        .route(
            "/api/applications/:id",
            patch(jobs::handlers::handle_update_application)
                .delete(jobs::handlers::handle_delete_application),
        )
        .route(
            "/api/applications/:id/stage",
            patch(jobs::handlers::handle_update_stage),
        )
        // Interview practice
        .route(
            "/api/interview/sessions",
            post(interview::handlers::handle_create_session),
        )
        .route(
            "/api/interview/sessions/:id",
            get(interview::handlers::handle_get_session),
        )
        .route(
            "/api/interview/sessions/:id/answers",
            post(interview::handlers::handle_submit_answer),
        )
        .route(
            "/api/interview/sessions/:id/feedback",
            get(interview::handlers::handle_get_feedback),
        )
        // Organization admin and profile (Java backend)
        .route(
            "/api/admin/organizations",
            get(admin::handlers::handle_list_organizations),
        )
        .route(
            "/api/admin/organizations/:id/approve",
            post(admin::handlers::handle_approve_organization),
        )
        .route(
            "/api/admin/organizations/:id/ban",
            post(admin::handlers::handle_ban_organization),
        )
        .route("/api/profile", get(admin::handlers::handle_get_profile))
        .route("/api/auth/me", get(auth::handle_me))
        .with_state(state)
}

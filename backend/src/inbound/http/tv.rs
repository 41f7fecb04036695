//! TV board and workflow reference data.
//!
//! Both endpoints are public: the TV display is an unattended kiosk and the
//! status list is static.

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, Language, TableBoard, WorkflowStatus, WorkflowStatusInfo};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Current board snapshot, identical to what `/ws/tv` pushes.
#[utoipa::path(
    get,
    path = "/api/v1/tv/board",
    responses(
        (status = 200, description = "All 27 table slots", body = TableBoard),
        (status = 503, description = "Database unavailable", body = Error)
    ),
    tags = ["tv"],
    operation_id = "tableBoard",
    security([])
)]
#[get("/tv/board")]
pub async fn table_board(state: web::Data<HttpState>) -> ApiResult<web::Json<TableBoard>> {
    Ok(web::Json(state.board.snapshot().await?))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatusQuery {
    /// Label language, `nl` (default) or `en`.
    #[serde(default)]
    pub lang: Language,
}

/// The fixed repair pipeline with labels, icons and progress.
#[utoipa::path(
    get,
    path = "/api/v1/workflow/statuses",
    params(StatusQuery),
    responses((status = 200, description = "Pipeline stages in order", body = [WorkflowStatusInfo])),
    tags = ["workflow"],
    operation_id = "workflowStatuses",
    security([])
)]
#[get("/workflow/statuses")]
pub async fn workflow_statuses(query: web::Query<StatusQuery>) -> web::Json<Vec<WorkflowStatusInfo>> {
    web::Json(WorkflowStatus::all(query.lang))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(table_board).service(workflow_statuses);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::ports::MockTableBoardQuery;
    use crate::domain::{BoardSlot, UserId};
    use crate::inbound::http::test_utils::state_for;
    use crate::test_support::fixture_now;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case("/api/v1/workflow/statuses", "Diagnose nodig")]
    #[case("/api/v1/workflow/statuses?lang=en", "Needs diagnosis")]
    #[actix_web::test]
    async fn statuses_are_listed_in_order(#[case] uri: &str, #[case] first_label: &str) {
        let app = test::init_service(
            App::new().service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let body: Value =
            test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
        let stages = body.as_array().expect("array");
        assert_eq!(stages.len(), 7);
        assert_eq!(stages[0].get("status").and_then(Value::as_str), Some("diagnose_nodig"));
        assert_eq!(stages[0].get("label").and_then(Value::as_str), Some(first_label));
        assert_eq!(stages[6].get("progressPercent").and_then(Value::as_f64), Some(100.0));
    }

    #[actix_web::test]
    async fn board_needs_no_token() {
        let mut board = MockTableBoardQuery::new();
        board.expect_snapshot().returning(|| {
            Ok(TableBoard {
                slots: vec![BoardSlot {
                    table: "1".to_owned(),
                    occupant: None,
                }],
                announcements: Vec::new(),
                generated_at: fixture_now(),
            })
        });
        let state = HttpState {
            board: Arc::new(board),
            ..state_for(UserId::random())
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").configure(configure)),
        )
        .await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/api/v1/tv/board").to_request(),
        )
        .await;
        assert_eq!(body.pointer("/slots/0/table").and_then(Value::as_str), Some("1"));
        assert!(body.pointer("/slots/0/occupant").is_some_and(Value::is_null));
    }
}

//! End-to-end scenarios for the document pipeline.

use dltforge_engine::output::spec_path;
use dltforge_engine::{Bindings, ComplexityFlags, WorkflowStage, WorkflowState, append, resolve};
use dltforge_templates::{Template, TemplateStore};
use dltforge_utils::error::WorkflowError;
use dltforge_utils::types::WorkflowPhase;

const SPEC_MAIN: &str = "\
---
id: spec_main
---
## Summary
Spec for {api_name}.
## Pagination
<!-- anchor: pagination -->
Default paginator.
## Resources
Issues and pulls.
";

const PAGINATION_APPENDIX: &str = "\
---
id: pagination_appendix
kind: appendix
target_anchor: pagination
---
## Complex Pagination Details
Link headers for {api_name}.
";

#[test]
fn test_appendix_lands_after_anchor_section() {
    let main = Template::parse("spec_main", SPEC_MAIN).unwrap();
    let appendix = Template::parse("pagination_appendix", PAGINATION_APPENDIX).unwrap();
    let bindings = Bindings::new().with("api_name", "github");

    let host = resolve(&main, &bindings).unwrap();
    let resolved = resolve(&appendix, &bindings).unwrap();
    let merged = append(&host, &resolved, appendix.target_anchor().unwrap()).unwrap();

    assert_eq!(
        merged.headings(),
        vec![
            "Summary",
            "Pagination",
            "Complex Pagination Details",
            "Resources"
        ]
    );
    assert!(merged.render().contains("Link headers for github.\n"));
}

#[test]
fn test_spec_file_name() {
    let bindings = Bindings::new()
        .with("api_name", "github")
        .with("date", "2026-01-26");
    assert_eq!(
        spec_path(&bindings).unwrap().as_str(),
        "specs/2026-01-26_011_spec_dlt_rest_client_github.md"
    );
}

#[test]
fn test_full_workflow_with_every_appendix() {
    let store = TemplateStore::builtin().unwrap();
    let mut state = WorkflowState::new("github");

    state
        .record_artifact(WorkflowPhase::Research, "research/r.md", "h0")
        .unwrap();
    state.advance().unwrap();
    state
        .set_flags(ComplexityFlags {
            has_custom_auth: true,
            has_mixed_pagination: true,
            has_compound_cursor: true,
            has_custom_retry_logic: true,
        })
        .unwrap();
    state
        .record_artifact(WorkflowPhase::Plan, "specs/s.md", "h1")
        .unwrap();

    let mut order = Vec::new();
    while let WorkflowStage::Phase(phase) = state.advance().unwrap() {
        order.push(phase);
        if phase == WorkflowPhase::Implement {
            break;
        }
        let id = phase.appendix_template_id().unwrap();
        assert!(store.load(id).is_ok());
        state.record_merge(phase, id, "specs/s.md", id).unwrap();
    }

    assert_eq!(
        order,
        vec![
            WorkflowPhase::AppendixAuth,
            WorkflowPhase::AppendixPagination,
            WorkflowPhase::AppendixIncremental,
            WorkflowPhase::AppendixRetry,
            WorkflowPhase::Implement,
        ]
    );
    assert_eq!(state.merged_appendices().len(), 4);
}

#[test]
fn test_return_to_plan_after_incomplete_implement_tasks() {
    let mut state = WorkflowState::new("github");
    state
        .record_artifact(WorkflowPhase::Research, "research/r.md", "h0")
        .unwrap();
    state.advance().unwrap();
    state
        .record_artifact(WorkflowPhase::Plan, "specs/s.md", "h1")
        .unwrap();
    state.advance().unwrap();

    state
        .add_task(WorkflowPhase::Implement, "write github_pipeline.py")
        .unwrap();
    let err = state.advance().unwrap_err();
    assert_eq!(
        err,
        WorkflowError::IncompleteTasks {
            phase: WorkflowPhase::Implement,
            pending: vec!["write github_pipeline.py".to_string()],
        }
    );

    state.complete_task(WorkflowPhase::Implement, 1).unwrap();
    assert_eq!(
        state.advance().unwrap(),
        WorkflowStage::Phase(WorkflowPhase::Test)
    );
}

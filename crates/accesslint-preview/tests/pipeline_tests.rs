use accesslint_core::{
    AuditMeta, ChannelBus, Impact, Level, Message, MessageBus, ReportOutcome, ReportStatus,
    SkippedAudit, Subscription, META_EVENT, RESULT_EVENT,
};
use accesslint_preview::{AuditConfig, ReportEmitter, StoryAuditor, StoryContext, TestMode};
use accesslint_test_utils::{rule, violation, FakeDocument, RecordingSink, ScriptedEngine};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Rig {
    engine: Arc<ScriptedEngine>,
    auditor: StoryAuditor,
    sink: Arc<RecordingSink>,
    sub: Subscription,
}

fn rig(engine: ScriptedEngine, config: AuditConfig) -> Rig {
    let engine = Arc::new(engine);
    let sink = Arc::new(RecordingSink::new());
    let bus = Arc::new(ChannelBus::new(64));
    let sub = bus.subscribe();
    let auditor = StoryAuditor::new(engine.clone(), config)
        .with_emitter(ReportEmitter::new().with_sink(sink.clone()).with_bus(bus));
    Rig {
        engine,
        auditor,
        sink,
        sub,
    }
}

fn messages(sub: &mut Subscription) -> Vec<Message> {
    sub.drain()
        .iter()
        .map(|e| Message::decode(e).unwrap())
        .collect()
}

fn document() -> FakeDocument {
    FakeDocument::new()
        .with_element("#storybook-root", None)
        .with_element("button", Some("#storybook-root"))
        .with_element("img", Some("#storybook-root"))
        .with_element("a.skip-link", None)
}

#[tokio::test]
async fn skip_tag_reports_skip_without_auditing() {
    let mut rig = rig(ScriptedEngine::new([]), AuditConfig::new());
    let story = StoryContext::new("card--wip").with_tags(["autodocs", "no-a11y"]);

    let record = rig.auditor.after_each(&story, &document()).await.unwrap();

    assert_eq!(
        record.result,
        ReportOutcome::Skipped(SkippedAudit::new("no-a11y"))
    );
    assert_eq!(record.status, ReportStatus::Passed);
    assert_eq!(rig.engine.counters().audits(), 0);
    assert_eq!(rig.sink.records(), vec![record]);

    let msgs = messages(&mut rig.sub);
    assert_eq!(msgs.len(), 1);
    assert!(matches!(&msgs[0], Message::Result(p) if p.result.is_skipped()));
}

#[tokio::test]
async fn configured_skip_tag_is_honored() {
    let rig = rig(
        ScriptedEngine::new([]),
        AuditConfig::new().with_skip_tags(["experimental"]),
    );
    let story = StoryContext::new("x").with_tags(["experimental"]);

    let record = rig.auditor.after_each(&story, &document()).await.unwrap();

    assert_eq!(
        record.result,
        ReportOutcome::Skipped(SkippedAudit::new("experimental"))
    );
    assert_eq!(rig.engine.counters().audits(), 0);
}

#[tokio::test]
async fn clean_audit_reports_passed_with_meta() {
    let mut rig = rig(
        ScriptedEngine::new([]).with_rule_count(20),
        AuditConfig::new(),
    );

    let record = rig
        .auditor
        .after_each(&StoryContext::new("button--primary"), &document())
        .await
        .unwrap();

    assert_eq!(record.status, ReportStatus::Passed);
    let msgs = messages(&mut rig.sub);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].event(), RESULT_EVENT);
    assert_eq!(msgs[1].event(), META_EVENT);
    let Message::Meta(AuditMeta {
        rule_count,
        passed,
        failed,
        violations,
        ..
    }) = msgs[1]
    else {
        panic!("expected meta, got {:?}", msgs[1]);
    };
    assert_eq!((rule_count, passed, failed, violations), (20, 20, 0, 0));
}

#[tokio::test]
async fn todo_mode_downgrades_to_warning() {
    let engine = ScriptedEngine::new([
        rule("button-name", Level::A, &["4.1.2"]),
        rule("image-alt", Level::A, &["1.1.1"]),
    ])
    .with_rule_count(10)
    .with_violations(vec![
        violation("button-name", "button", Impact::Critical),
        violation("image-alt", "img", Impact::Critical),
        violation("image-alt", "img", Impact::Serious),
    ]);
    let mut rig = rig(engine, AuditConfig::new().with_test_mode(TestMode::Todo));

    let record = rig
        .auditor
        .after_each(&StoryContext::new("card"), &document())
        .await
        .unwrap();

    assert_eq!(record.status, ReportStatus::Warning);
    assert_eq!(record.result.violation_count(), 3);
    let meta = messages(&mut rig.sub)
        .into_iter()
        .find_map(|m| match m {
            Message::Meta(meta) => Some(meta),
            _ => None,
        })
        .unwrap();
    assert_eq!(meta.failed, 2);
    assert_eq!(meta.passed, 8);
}

#[tokio::test]
async fn root_scopes_violations() {
    let engine = ScriptedEngine::new([]).with_violations(vec![
        violation("button-name", "button", Impact::Critical),
        violation("link-name", "a.skip-link", Impact::Serious),
        violation("image-alt", "#storybook-preview-iframe >>> iframe> img", Impact::Critical),
    ]);
    let rig = rig(engine, AuditConfig::new());
    let doc = document();
    let story = StoryContext::new("card").with_root(doc.element("#storybook-root"));

    let record = rig.auditor.after_each(&story, &doc).await.unwrap();

    let rules: Vec<_> = record
        .result
        .violations()
        .iter()
        .map(|v| v.rule_id().to_string())
        .collect();
    assert_eq!(rules, vec!["button-name", "image-alt"]);
    assert_eq!(record.status, ReportStatus::Failed);
}

#[tokio::test]
async fn missing_root_reports_everything() {
    let engine = ScriptedEngine::new([]).with_violations(vec![
        violation("button-name", "button", Impact::Critical),
        violation("link-name", "a.skip-link", Impact::Serious),
        violation("label", "input[", Impact::Serious),
    ]);
    let rig = rig(engine, AuditConfig::new());

    let record = rig
        .auditor
        .after_each(&StoryContext::new("card"), &document())
        .await
        .unwrap();

    assert_eq!(record.result.violation_count(), 3);
}

#[tokio::test]
async fn engine_fault_produces_no_report() {
    let engine = ScriptedEngine::new([]).with_slices(3).failing_at_slice(2);
    let mut rig = rig(engine, AuditConfig::new());

    let record = rig
        .auditor
        .after_each(&StoryContext::new("card"), &document())
        .await;

    assert!(record.is_none());
    assert!(rig.sink.records().is_empty());
    assert!(rig.sub.drain().is_empty());
}

#[tokio::test]
async fn same_story_runs_one_at_a_time() {
    let engine = ScriptedEngine::new([])
        .with_violations(vec![violation("region", "button", Impact::Moderate)])
        .with_slices(4);
    let rig = rig(engine, AuditConfig::new());
    let doc = document();
    let story = StoryContext::new("card");

    let (first, second) = tokio::join!(
        rig.auditor.after_each(&story, &doc),
        rig.auditor.after_each(&story, &doc),
    );

    assert_eq!(
        usize::from(first.is_some()) + usize::from(second.is_some()),
        1
    );
    assert_eq!(rig.engine.counters().audits(), 1);

    // slot is free again once the run finished
    assert!(rig.auditor.after_each(&story, &doc).await.is_some());
}

#[tokio::test]
async fn story_switch_discards_stale_result() {
    let engine = ScriptedEngine::new([])
        .with_violations(vec![violation("region", "button", Impact::Moderate)])
        .with_slices(6);
    let mut rig = rig(engine, AuditConfig::new());
    let doc = document();
    let story_a = StoryContext::new("card--a");

    let (record, ()) = tokio::join!(
        rig.auditor.after_each(&story_a, &doc),
        async {
            tokio::task::yield_now().await;
            rig.auditor.select(Some("card--b"));
        },
    );

    assert!(record.is_none());
    assert!(rig.sink.records().is_empty());
    assert!(rig.sub.drain().is_empty());
}

#[tokio::test]
async fn overlapping_runs_for_different_stories_both_report() {
    let engine = ScriptedEngine::new([])
        .with_violations(vec![violation("region", "button", Impact::Moderate)])
        .with_slices(4);
    let mut rig = rig(engine, AuditConfig::new());
    let doc = document();
    let story_a = StoryContext::new("card--a");
    let story_b = StoryContext::new("card--b");

    let (a, b) = tokio::join!(
        rig.auditor.after_each(&story_a, &doc),
        rig.auditor.after_each(&story_b, &doc),
    );

    assert_eq!(a.map(|r| r.status), Some(ReportStatus::Failed));
    assert_eq!(b.map(|r| r.status), Some(ReportStatus::Failed));
    assert_eq!(rig.engine.counters().audits(), 2);
    assert_eq!(rig.sink.records().len(), 2);

    let story_ids: Vec<Option<String>> = messages(&mut rig.sub)
        .into_iter()
        .filter_map(|m| match m {
            Message::Result(p) => Some(p.story_id),
            _ => None,
        })
        .collect();
    assert_eq!(story_ids.len(), 2);
    assert!(story_ids.contains(&Some("card--a".to_string())));
    assert!(story_ids.contains(&Some("card--b".to_string())));
}

#[tokio::test]
async fn reselecting_the_audited_story_keeps_its_result() {
    let engine = ScriptedEngine::new([])
        .with_violations(vec![violation("region", "button", Impact::Moderate)])
        .with_slices(4);
    let rig = rig(engine, AuditConfig::new());
    let doc = document();
    let story = StoryContext::new("card--a");

    let (record, ()) = tokio::join!(rig.auditor.after_each(&story, &doc), async {
        tokio::task::yield_now().await;
        rig.auditor.select(Some("card--a"));
    });

    assert!(record.is_some());
    assert_eq!(rig.sink.records().len(), 1);
}

#[tokio::test]
async fn later_reports_replace_earlier_ones_in_order() {
    let engine = ScriptedEngine::new([])
        .with_violations(vec![violation("region", "button", Impact::Moderate)]);
    let mut rig = rig(engine, AuditConfig::new());
    let doc = document();
    let story = StoryContext::new("card");

    rig.auditor.after_each(&story, &doc).await.unwrap();
    rig.engine.load(Vec::new());
    rig.auditor.after_each(&story, &doc).await.unwrap();

    let counts: Vec<usize> = messages(&mut rig.sub)
        .into_iter()
        .filter_map(|m| match m {
            Message::Result(p) => Some(p.result.violation_count()),
            _ => None,
        })
        .collect();
    assert_eq!(counts, vec![1, 0]);
    assert_eq!(rig.sink.last().unwrap().status, ReportStatus::Passed);
}

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use anvil_core::{
    Child, Core, Engine, EngineBuilder, EngineError, EngineOptions, HookResult, MaybeFn,
    MergeMode, Node, Plugin, Reserved, SetupContext,
};
use futures_util::future::{FutureExt, LocalBoxFuture};
use serde_json::{json, Value};

// ── Probe engine ───────────────────────────────────────────────────────────

#[derive(Clone)]
struct Probe {
    core: Rc<Core<Probe>>,
}

#[derive(Default)]
struct ProbeOptions {
    name: Option<String>,
    config: Value,
    plugins: Vec<Rc<dyn ProbePlugin>>,
    label: String,
}

impl EngineOptions for ProbeOptions {
    type Plugin = dyn ProbePlugin;

    fn take_reserved(&mut self) -> Reserved<dyn ProbePlugin> {
        Reserved {
            name: self.name.take(),
            config: std::mem::take(&mut self.config),
            plugins: std::mem::take(&mut self.plugins),
        }
    }
}

trait ProbePlugin: Plugin<Probe> {
    fn on_probe(&self, _probe: &Probe) -> Option<&'static str> {
        None
    }

    fn on_probe_async(&self, _probe: &Probe) -> LocalBoxFuture<'static, Option<&'static str>> {
        futures_util::future::ready(None).boxed_local()
    }
}

impl Engine for Probe {
    type Options = ProbeOptions;
    type Plugin = dyn ProbePlugin;

    fn core(&self) -> &Core<Self> {
        &self.core
    }

    fn from_core(core: Core<Self>) -> Self {
        Probe {
            core: Rc::new(core),
        }
    }
}

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    tag: &'static str,
    log: Log,
}

impl Recorder {
    fn new(tag: &'static str, log: &Log) -> Rc<Self> {
        Rc::new(Recorder {
            tag,
            log: Rc::clone(log),
        })
    }

    fn record(&self, hook: &str) -> HookResult {
        self.log.borrow_mut().push(format!("{}:{hook}", self.tag));
        Ok(())
    }
}

impl Plugin<Probe> for Recorder {
    fn name(&self) -> &str {
        self.tag
    }

    fn on_init(&self, _probe: &Probe) -> HookResult {
        self.record("onInit")
    }

    fn on_config(&self, _probe: &Probe, _config: &anvil_core::Config) -> HookResult {
        self.record("onConfig")
    }

    fn on_options_before(&self, _probe: &Probe) -> HookResult {
        self.record("onOptionsBefore")
    }

    fn on_options(&self, _probe: &Probe, options: &mut ProbeOptions) -> HookResult {
        assert!(options.plugins.is_empty(), "reserved keys are stripped");
        assert!(options.config.is_null(), "reserved keys are stripped");
        self.record("onOptions")
    }

    fn on_options_after(&self, _probe: &Probe) -> HookResult {
        self.record("onOptionsAfter")
    }

    fn on_component(&self, _probe: &Probe, _component: &mut anvil_core::ComponentSpec) -> HookResult {
        self.record("onComponent")
    }

    fn on_setup(&self, _probe: &Probe, _ctx: &mut SetupContext) -> HookResult {
        self.record("onSetup")
    }
}

impl ProbePlugin for Recorder {}

fn builder() -> EngineBuilder<Probe> {
    EngineBuilder::new("AnProbe")
}

// ── Construction ───────────────────────────────────────────────────────────

#[test]
fn hooks_run_in_protocol_order_factory_plugins_first() {
    let log: Log = Rc::default();
    let factory = builder().use_plugin(Recorder::new("a", &log)).build();
    let probe = factory
        .create_with_options(ProbeOptions {
            plugins: vec![Recorder::new("b", &log)],
            ..Default::default()
        })
        .unwrap();

    let expected: Vec<String> = [
        "onInit",
        "onConfig",
        "onOptionsBefore",
        "onOptions",
        "onOptionsAfter",
        "onComponent",
    ]
    .iter()
    .flat_map(|hook| [format!("a:{hook}"), format!("b:{hook}")])
    .collect();
    assert_eq!(*log.borrow(), expected);

    log.borrow_mut().clear();
    probe.setup().unwrap();
    assert_eq!(*log.borrow(), vec!["a:onSetup", "b:onSetup"]);
}

#[test]
fn options_factory_receives_the_engine_handle() {
    let factory = builder().build();
    let seen = Rc::new(RefCell::new(String::new()));
    let sink = Rc::clone(&seen);
    let probe = factory
        .create(MaybeFn::from_fn(move |probe: &Probe| {
            *sink.borrow_mut() = probe.id().to_string();
            ProbeOptions {
                label: "from-factory".into(),
                ..Default::default()
            }
        }))
        .unwrap();

    assert_eq!(*seen.borrow(), probe.id().to_string());
    assert_eq!(probe.core().options().label, "from-factory");
}

#[test]
fn instance_config_wins_over_factory_defaults() {
    let factory = builder()
        .set_config(json!({ "paging": { "current": 1, "pageSize": 10 } }), MergeMode::Merge)
        .build();
    let probe = factory
        .create_with_options(ProbeOptions {
            config: json!({ "paging": { "pageSize": 20 } }),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(probe.config().get::<u64>("paging.pageSize").unwrap(), 20);
    assert_eq!(probe.config().get::<u64>("paging.current").unwrap(), 1);
    assert_eq!(probe.name(), "AnProbe");
}

#[test]
fn options_name_overrides_config_name() {
    let probe = builder()
        .build()
        .create_with_options(ProbeOptions {
            name: Some("UserTable".into()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(probe.name(), "UserTable");
}

#[test]
fn yaml_config_feeds_the_factory() {
    let factory = builder()
        .config_yaml("tableProps:\n  rowKey: uid\n")
        .unwrap()
        .build();
    let probe = factory.create_with_options(ProbeOptions::default()).unwrap();
    assert_eq!(probe.config().get::<String>("tableProps.rowKey").unwrap(), "uid");
}

struct Failing;

impl Plugin<Probe> for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_options(&self, _probe: &Probe, _options: &mut ProbeOptions) -> HookResult {
        Err(EngineError::plugin("failing", "bad options"))
    }
}

impl ProbePlugin for Failing {}

#[test]
fn hook_error_aborts_construction() {
    let log: Log = Rc::default();
    let factory = builder()
        .use_plugin(Rc::new(Failing))
        .use_plugin(Recorder::new("after", &log))
        .build();

    let err = factory
        .create_with_options(ProbeOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, EngineError::Plugin { ref plugin, .. } if plugin == "failing"));
    assert!(!log.borrow().contains(&"after:onOptions".to_string()));
    assert!(!log.borrow().contains(&"after:onOptionsAfter".to_string()));
}

// ── State and children ─────────────────────────────────────────────────────

#[test]
fn set_state_concatenates_arrays_and_fills_defaults() {
    let probe = builder().build().create_with_options(ProbeOptions::default()).unwrap();

    probe.set_state(json!({ "items": [1] }), MergeMode::Merge);
    probe.set_state(json!({ "items": [2] }), MergeMode::Merge);
    probe.set_state(json!({ "props": { "class": "x" }, "items": [9] }), MergeMode::Defaults);

    assert_eq!(
        probe.get_state(),
        json!({ "props": { "class": "x" }, "items": [1, 2] })
    );
}

#[test]
fn children_render_in_stable_order() {
    let probe = builder().build().create_with_options(ProbeOptions::default()).unwrap();
    for (key, order) in [("a", 10), ("b", 5), ("c", 10), ("d", 5)] {
        probe.add_child(
            Child::new(move |_: &Probe| Node::element("Section").prop("name", key))
                .with_key(key)
                .with_order(order),
        );
    }

    let root = probe.render();
    let names: Vec<String> = root
        .find_all_by_tag("Section")
        .iter()
        .map(|section| section.key.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, vec!["b", "d", "a", "c"]);
    assert_eq!(root.as_element().unwrap().tag, "div");
}

#[test]
fn children_get_distinct_default_keys() {
    let a = Child::new(|_: &Probe| Node::Empty);
    let b = Child::new(|_: &Probe| Node::Empty);
    assert_ne!(a.key(), b.key());
    assert_eq!(a.order(), 10);
}

// ── Dispatch ───────────────────────────────────────────────────────────────

struct Claim {
    tag: &'static str,
    answer: Option<&'static str>,
    calls: Rc<Cell<u32>>,
    delay: Duration,
    log: Log,
}

impl Plugin<Probe> for Claim {
    fn name(&self) -> &str {
        self.tag
    }
}

impl ProbePlugin for Claim {
    fn on_probe(&self, _probe: &Probe) -> Option<&'static str> {
        self.calls.set(self.calls.get() + 1);
        self.answer
    }

    fn on_probe_async(&self, _probe: &Probe) -> LocalBoxFuture<'static, Option<&'static str>> {
        let (tag, answer, delay, log) = (self.tag, self.answer, self.delay, Rc::clone(&self.log));
        async move {
            log.borrow_mut().push(format!("{tag}:start"));
            tokio::time::sleep(delay).await;
            log.borrow_mut().push(format!("{tag}:end"));
            answer
        }
        .boxed_local()
    }
}

fn claims(log: &Log, calls: &Rc<Cell<u32>>) -> EngineBuilder<Probe> {
    let claim = |tag, answer, delay| {
        Rc::new(Claim {
            tag,
            answer,
            calls: Rc::clone(calls),
            delay: Duration::from_millis(delay),
            log: Rc::clone(log),
        })
    };
    builder()
        .use_plugin(claim("x", None, 30))
        .use_plugin(claim("y", Some("y"), 10))
        .use_plugin(claim("z", Some("z"), 0))
}

#[test]
fn call_first_stops_at_first_claim() {
    let (log, calls) = (Log::default(), Rc::new(Cell::new(0)));
    let probe = claims(&log, &calls)
        .build()
        .create_with_options(ProbeOptions::default())
        .unwrap();

    let answer = probe.core().call_first("onProbe", |p| p.on_probe(&probe));
    assert_eq!(answer, Some("y"));
    assert_eq!(calls.get(), 2, "z is never consulted");
}

#[tokio::test(start_paused = true)]
async fn call_first_async_awaits_candidates_sequentially() {
    let (log, calls) = (Log::default(), Rc::new(Cell::new(0)));
    let probe = claims(&log, &calls)
        .build()
        .create_with_options(ProbeOptions::default())
        .unwrap();

    let answer = probe
        .core()
        .call_first_async("onProbeAsync", |p| p.on_probe_async(&probe))
        .await;

    assert_eq!(answer, Some("y"));
    assert_eq!(*log.borrow(), vec!["x:start", "x:end", "y:start", "y:end"]);
}

#[test]
fn call_all_collects_results_in_order() {
    let (log, calls) = (Log::default(), Rc::new(Cell::new(0)));
    let probe = claims(&log, &calls)
        .build()
        .create_with_options(ProbeOptions::default())
        .unwrap();

    let answers = probe
        .core()
        .call_all("onProbe", |p| Ok(p.on_probe(&probe)))
        .unwrap();
    assert_eq!(answers, vec!["y", "z"]);
}

use crate::config::ControllerConfig;
use crate::controller::{Controller, ControllerView, SignalObserver, Tick, TickDriver, TickReport};
use std::time::{Duration, Instant};

#[derive(Default)]
struct Recorder {
    ticks: Vec<u64>,
    activations: Vec<usize>,
    last_view: Option<ControllerView>,
}

impl SignalObserver for Recorder {
    fn on_tick(&mut self, report: &TickReport, view: &ControllerView) {
        self.ticks.push(report.tick.0);
        if let Some(j) = report.activated {
            self.activations.push(j);
        }
        self.last_view = Some(view.clone());
    }
}

fn controller() -> Controller {
    Controller::new(ControllerConfig::default()).expect("controller")
}

#[test]
fn run_until_steps_to_target_and_notifies_observer() {
    let mut c = controller();
    let mut d = TickDriver::unpaced();
    let mut rec = Recorder::default();

    d.run_until(Tick(60), &mut c, &mut rec);
    assert_eq!(d.now(), Tick(60));
    assert_eq!(rec.ticks, (1..=60).collect::<Vec<_>>());
    assert_eq!(rec.activations, vec![1, 2]);
    assert_eq!(rec.last_view.as_ref().expect("view").tick, Tick(60));

    // 已到达目标时不再推进
    d.run_until(Tick(30), &mut c, &mut rec);
    assert_eq!(d.now(), Tick(60));
    assert_eq!(c.elapsed(), Tick(60));
}

#[test]
fn unit_observer_is_a_noop() {
    let mut c = controller();
    let mut d = TickDriver::unpaced();
    let r = d.step(&mut c, &mut ());
    assert_eq!(r.tick, Tick(1));
    assert_eq!(d.now(), Tick(1));
}

#[test]
fn paced_driver_spaces_ticks_by_period() {
    let mut c = controller();
    let mut d = TickDriver::new(Some(Duration::from_millis(10)));
    let start = Instant::now();
    d.run_until(Tick(5), &mut c, &mut ());
    let elapsed = start.elapsed();
    // 第一个 tick 立即执行，之后每 10ms 一个
    assert!(elapsed >= Duration::from_millis(40), "too fast: {elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "too slow: {elapsed:?}");
}

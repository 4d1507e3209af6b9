//! End-to-end behavior of loaded netlists driven through the simulator.

use logicsim_core::circuit::{Circuit, CircuitRecord, Position};
use logicsim_core::components::InputPort;
use logicsim_core::engine::{PassPhase, SetOutcome};
use logicsim_core::error::{LogicError, SimFault};
use logicsim_core::value::{Bus, Signal, Value};
use logicsim_core::{Simulator, SimulatorConfig};

fn level(sim: &Simulator, net: &str) -> Value {
    sim.probe(net).unwrap().scalar()
}

fn applied(outcome: SetOutcome) -> logicsim_core::engine::PassReport {
    match outcome {
        SetOutcome::Applied(report) => report,
        SetOutcome::Scheduled { at } => panic!("expected an immediate set, got one scheduled at {}", at),
    }
}

#[test]
fn test_and_gate_with_unknown_input() {
    let mut sim = Simulator::from_netlist(
        "\
SWITCH a a
SWITCH b b
AND g a b y
AND h a floating z
",
    )
    .unwrap();
    sim.propagate();
    assert_eq!(level(&sim, "y"), Value::False);
    assert_eq!(level(&sim, "z"), Value::False);

    sim.set_by_label("a", Signal::from(true)).unwrap();
    assert_eq!(level(&sim, "y"), Value::False);
    assert_eq!(level(&sim, "z"), Value::Unknown);

    sim.set_by_label("b", Signal::from(true)).unwrap();
    assert_eq!(level(&sim, "y"), Value::True);
}

#[test]
fn test_sr_latch_holds_state() {
    let mut sim = Simulator::from_netlist(
        "\
SWITCH set s
SWITCH reset r
NOR top r qn q
NOR bottom s q qn
",
    )
    .unwrap();
    assert!(sim.propagate().is_settled());

    // Pulse reset to put the latch in a known state first.
    applied(sim.set_by_label("reset", Signal::from(true)).unwrap());
    applied(sim.set_by_label("reset", Signal::from(false)).unwrap());
    assert_eq!(level(&sim, "q"), Value::False);
    assert_eq!(level(&sim, "qn"), Value::True);

    let report = applied(sim.set_by_label("set", Signal::from(true)).unwrap());
    assert!(report.is_settled());
    assert_eq!(level(&sim, "q"), Value::True);
    assert_eq!(level(&sim, "qn"), Value::False);

    let report = applied(sim.set_by_label("set", Signal::from(false)).unwrap());
    assert!(report.is_settled());
    assert_eq!(level(&sim, "q"), Value::True);
    assert_eq!(level(&sim, "qn"), Value::False);

    sim.set_by_label("reset", Signal::from(true)).unwrap();
    sim.set_by_label("reset", Signal::from(false)).unwrap();
    assert_eq!(level(&sim, "q"), Value::False);
    assert_eq!(level(&sim, "qn"), Value::True);
}

#[test]
fn test_self_fed_inverter_stalls_and_reports() {
    let mut sim = Simulator::from_netlist("NOT n y y\n").unwrap();
    let report = sim.propagate();
    assert_eq!(report.phase, PassPhase::Stalled);
    assert_eq!(report.rounds, 1000);
    assert_eq!(report.faults, vec![SimFault::Stall { rounds: 1000 }]);
}

#[test]
fn test_oscillator_reports_stall_and_keeps_running() {
    let design = logicsim_core::circuit::Design::from_netlist("SWITCH s a state=1\nNOR g a y y\n").unwrap();
    let config = SimulatorConfig::new().with_max_rounds(20);
    let mut sim = Simulator::with_config(design.library, &design.top, config).unwrap();
    assert!(sim.propagate().is_settled());
    assert_eq!(level(&sim, "y"), Value::False);

    let report = applied(sim.set_by_label("s", Signal::from(false)).unwrap());
    assert_eq!(report.phase, PassPhase::Stalled);
    assert_eq!(report.rounds, 20);
    assert_eq!(report.faults, vec![SimFault::Stall { rounds: 20 }]);
    assert_eq!(sim.phase(), PassPhase::Stalled);

    let report = applied(sim.set_by_label("s", Signal::from(true)).unwrap());
    assert!(report.is_settled());
    assert_eq!(level(&sim, "y"), Value::False);
}

#[test]
fn test_settled_pass_is_idempotent() {
    let mut sim = Simulator::from_netlist(
        "\
SWITCH a a state=1
NOT n1 a b
NOT n2 b c
XOR x a c d
",
    )
    .unwrap();
    let first = sim.propagate();
    assert!(first.is_settled());
    let before: Vec<Signal> = ["a", "b", "c", "d"].iter().map(|n| sim.probe(n).unwrap()).collect();

    let second = sim.propagate();
    assert_eq!(second.rounds, 1);
    let after: Vec<Signal> = ["a", "b", "c", "d"].iter().map(|n| sim.probe(n).unwrap()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_clock_glitch_within_one_pass_does_not_trigger() {
    // The AND sees `s` rise before the inverter catches up, so its output
    // pulses high for one round.
    let mut sim = Simulator::from_netlist(
        "\
SWITCH s s
AND pulse s ns clk
NOT inv s ns
CONST one d value=1
DFF ff d clk q _
",
    )
    .unwrap();
    sim.propagate();
    assert_eq!(level(&sim, "clk"), Value::False);
    assert_eq!(level(&sim, "q"), Value::False);

    let report = applied(sim.set_by_label("s", Signal::from(true)).unwrap());
    assert!(report.is_settled());
    assert!(report.rounds >= 2);
    assert_eq!(level(&sim, "clk"), Value::False);
    assert_eq!(level(&sim, "q"), Value::False);
}

#[test]
fn test_toggle_flip_flop_fires_once_per_rising_edge() {
    let mut sim = Simulator::from_netlist("SWITCH c c\nDFF ff qn c q qn\n").unwrap();
    sim.propagate();
    assert_eq!(level(&sim, "q"), Value::False);

    let mut seen = Vec::new();
    for _ in 0..3 {
        sim.set_by_label("c", Signal::from(true)).unwrap();
        seen.push(level(&sim, "q"));
        sim.set_by_label("c", Signal::from(false)).unwrap();
        assert_eq!(level(&sim, "q"), *seen.last().unwrap());
    }
    assert_eq!(seen, vec![Value::True, Value::False, Value::True]);
}

const SHIFT_FIRST_STAGE_FIRST: &str = "\
SWITCH c clk
SWITCH d d
DFF f1 d clk q1 _
DFF f2 q1 clk q2 _
";

const SHIFT_LAST_STAGE_FIRST: &str = "\
SWITCH c clk
SWITCH d d
DFF f2 q1 clk q2 _
DFF f1 d clk q1 _
";

fn run_shift_register(netlist: &str) {
    let mut sim = Simulator::from_netlist(netlist).unwrap();
    sim.propagate();
    sim.set_by_label("d", Signal::from(true)).unwrap();
    assert_eq!(level(&sim, "q1"), Value::False);

    sim.set_by_label("c", Signal::from(true)).unwrap();
    assert_eq!(level(&sim, "q1"), Value::True);
    assert_eq!(level(&sim, "q2"), Value::False);

    sim.set_by_label("c", Signal::from(false)).unwrap();
    sim.set_by_label("d", Signal::from(false)).unwrap();
    sim.set_by_label("c", Signal::from(true)).unwrap();
    assert_eq!(level(&sim, "q1"), Value::False);
    assert_eq!(level(&sim, "q2"), Value::True);
}

#[test]
fn test_shift_register_first_stage_listed_first() {
    run_shift_register(SHIFT_FIRST_STAGE_FIRST);
}

#[test]
fn test_shift_register_last_stage_listed_first() {
    run_shift_register(SHIFT_LAST_STAGE_FIRST);
}

#[test]
fn test_clock_drives_divider_over_time() {
    let mut sim = Simulator::from_netlist(
        "\
CLOCK clk c freq=100
NOT inv q nq
DFF ff nq c q _
",
    )
    .unwrap();
    sim.advance(0.0).unwrap();
    assert_eq!(level(&sim, "c"), Value::False);
    assert_eq!(level(&sim, "q"), Value::False);

    sim.advance(5.0).unwrap();
    assert_eq!(level(&sim, "c"), Value::True);
    assert_eq!(level(&sim, "q"), Value::True);

    sim.advance(10.0).unwrap();
    assert_eq!(level(&sim, "q"), Value::False);

    // Edges at 20, 25, 30 and 35 all fall inside one call.
    let report = sim.advance(20.0).unwrap();
    assert_eq!(report.steps, 4);
    assert!(!report.truncated);
    assert_eq!(level(&sim, "q"), Value::False);
    assert!((sim.now() - 35.0).abs() < 1e-9);
}

#[test]
fn test_step_ceiling_truncates_advance() {
    let design = logicsim_core::circuit::Design::from_netlist("CLOCK clk c freq=1000\n").unwrap();
    let config = SimulatorConfig::new().with_max_steps(3);
    let mut sim = Simulator::with_config(design.library, &design.top, config).unwrap();
    let report = sim.advance(100.0).unwrap();
    assert!(report.truncated);
    assert_eq!(report.steps, 3);
    assert!((sim.now() - 100.0).abs() < 1e-9);
}

#[test]
fn test_keypad_commits_after_default_debounce() {
    let mut sim = Simulator::from_netlist("KEYPAD k code pressed\n").unwrap();
    sim.propagate();
    let outcome = sim.set_by_label("k", Signal::Bus(Bus::from_u64(5, 4))).unwrap();
    assert_eq!(outcome, SetOutcome::Scheduled { at: 50.0 });

    sim.advance(49.0).unwrap();
    assert_eq!(level(&sim, "pressed"), Value::False);
    assert!(!sim.probe("code").unwrap().is_known());

    let report = sim.advance(1.0).unwrap();
    assert_eq!(report.events, 1);
    assert_eq!(level(&sim, "pressed"), Value::True);
    assert_eq!(sim.probe("code").unwrap().to_u64(), Some(5));

    assert!(matches!(
        sim.set_by_label("k", Signal::Bus(Bus::from_u64(31, 5))),
        Err(LogicError::InvalidInjection { .. })
    ));
}

#[test]
fn test_bus_adder_through_split_and_merge() {
    let mut sim = Simulator::from_netlist(
        "\
CONST ka a width=4 value=0x9
CONST kb b width=4 value=8
SWITCH carry cin
ADD add a b cin sum cout width=4
SPLIT sp sum s0 s1 s2 s3 width=4
MERGE mg s0 s1 s2 s3 back width=4
",
    )
    .unwrap();
    sim.propagate();
    assert_eq!(sim.probe("sum").unwrap().to_u64(), Some(1));
    assert_eq!(level(&sim, "cout"), Value::True);
    assert_eq!(level(&sim, "s0"), Value::True);
    assert_eq!(sim.probe("back").unwrap().to_u64(), Some(1));

    sim.set_by_label("carry", Signal::from(true)).unwrap();
    assert_eq!(sim.probe("back").unwrap().to_u64(), Some(2));

    sim.set_by_label("carry", Signal::UNKNOWN).unwrap();
    assert_eq!(level(&sim, "s0"), Value::Unknown);
    assert!(!sim.probe("back").unwrap().is_known());
}

const CELL: &str = "\
.circuit cell
IN  a a x=0 y=0
IN  b b x=0 y=1
AND g a b y
OUT o y x=2 y=0
.end
SWITCH sa a state=1
SWITCH sb b state=1
REF u cell a b y
PROBE p y
";

#[test]
fn test_sub_circuit_instances_are_private() {
    let mut sim = Simulator::from_netlist(
        "\
.circuit inv
IN  i i
NOT n i o
OUT q o x=1
.end
SWITCH s a
REF first inv a b
REF second inv b c
",
    )
    .unwrap();
    sim.propagate();
    assert_eq!(level(&sim, "b"), Value::True);
    assert_eq!(level(&sim, "c"), Value::False);

    sim.set_by_label("s", Signal::from(true)).unwrap();
    assert_eq!(level(&sim, "b"), Value::False);
    assert_eq!(level(&sim, "c"), Value::True);
}

#[test]
fn test_rename_keeps_outer_wiring() {
    let mut sim = Simulator::from_netlist(CELL).unwrap();
    sim.propagate();
    assert_eq!(level(&sim, "y"), Value::True);

    sim.library_mut()
        .edit("cell", |cell| {
            let a = cell.find("a").unwrap();
            cell.set_label(a, "alpha")
        })
        .unwrap()
        .unwrap();
    assert!(sim.propagate().is_settled());

    let circuit = sim.circuit();
    let u = circuit.find("u").unwrap();
    let pin = circuit.pin(circuit.input_pin(u, 0).unwrap()).unwrap();
    assert_eq!(pin.name(), "alpha");
    assert_eq!(pin.driver(), circuit.net("a"));
    assert_eq!(level(&sim, "y"), Value::True);
}

#[test]
fn test_deleted_port_disconnects_only_its_pin() {
    let mut sim = Simulator::from_netlist(CELL).unwrap();
    sim.propagate();

    sim.library_mut()
        .edit("cell", |cell| {
            let b = cell.find("b").unwrap();
            cell.remove_component(b).is_some()
        })
        .unwrap();
    sim.propagate();

    let circuit = sim.circuit();
    let u = circuit.find("u").unwrap();
    assert_eq!(circuit.inputs(u).len(), 1);
    assert_eq!(circuit.pin(circuit.input_pin(u, 0).unwrap()).unwrap().driver(), circuit.net("a"));
    let b_driver = circuit.pin(circuit.net("b").unwrap()).unwrap();
    assert!(b_driver.fanout().is_empty());
    // The inner AND lost an input, so its output is no longer known.
    assert_eq!(level(&sim, "y"), Value::Unknown);
}

#[test]
fn test_added_port_appears_unconnected() {
    let mut sim = Simulator::from_netlist(CELL).unwrap();
    sim.propagate();

    sim.library_mut()
        .edit("cell", |cell| {
            cell.add_component_at("c", Box::new(InputPort::new(1)), Position::new(0, 2));
        })
        .unwrap();
    sim.propagate();

    let circuit = sim.circuit();
    let u = circuit.find("u").unwrap();
    assert_eq!(circuit.inputs(u).len(), 3);
    let added = circuit.pin(circuit.input_pin(u, 2).unwrap()).unwrap();
    assert_eq!(added.name(), "c");
    assert_eq!(added.driver(), None);
    assert_eq!(circuit.pin(circuit.input_pin(u, 1).unwrap()).unwrap().driver(), circuit.net("b"));
    assert_eq!(level(&sim, "y"), Value::True);
}

#[test]
fn test_missing_target_is_a_fault() {
    let mut sim = Simulator::from_netlist(CELL).unwrap();
    sim.propagate();

    let cell = sim.library_mut().remove("cell").unwrap();
    let report = sim.propagate();
    assert!(report.faults.contains(&SimFault::UnboundReference {
        component: "u".to_string(),
        target: "cell".to_string(),
    }));
    assert_eq!(level(&sim, "y"), Value::Unknown);
    let u = sim.circuit().find("u").unwrap();
    assert_eq!(sim.circuit().inputs(u).len(), 2);

    // Restoring the definition reuses the pins and wiring kept meanwhile.
    sim.library_mut().insert(cell).unwrap();
    assert!(sim.propagate().faults.is_empty());
    let circuit = sim.circuit();
    assert_eq!(circuit.pin(circuit.input_pin(u, 0).unwrap()).unwrap().driver(), circuit.net("a"));
    assert_eq!(circuit.pin(circuit.input_pin(u, 1).unwrap()).unwrap().driver(), circuit.net("b"));
    assert_eq!(level(&sim, "y"), Value::True);
}

#[test]
fn test_cyclic_reference_is_a_fault() {
    let mut sim = Simulator::from_netlist(
        "\
.circuit a
REF rb b
.end
.circuit b
REF ra a
.end
REF top a
",
    )
    .unwrap();
    let report = sim.propagate();
    assert!(report.faults.iter().any(|fault| matches!(
        fault,
        SimFault::CyclicReference { component, cycle } if component == "top" && cycle.first() == cycle.last()
    )));
}

#[test]
fn test_record_round_trip_preserves_behavior() {
    let sim = Simulator::from_netlist(
        "\
SWITCH a a
SWITCH b b
XOR sum a b s
AND carry a b c
",
    )
    .unwrap();
    let record = sim.library().get("main").unwrap().to_record();
    let json = serde_json::to_string(&record).unwrap();
    let restored: CircuitRecord = serde_json::from_str(&json).unwrap();
    let circuit = Circuit::from_record(&restored, sim.library()).unwrap();

    let mut copy = Simulator::from_circuit(circuit);
    copy.set_by_label("a", Signal::from(true)).unwrap();
    copy.set_by_label("b", Signal::from(true)).unwrap();
    assert_eq!(level(&copy, "s"), Value::False);
    assert_eq!(level(&copy, "c"), Value::True);
}

#[test]
fn test_netlist_errors_surface_as_logic_errors() {
    assert!(matches!(
        Simulator::from_netlist("AND g a\nAND g b\n"),
        Err(LogicError::DuplicateComponent { .. })
    ));
    assert!(matches!(
        Simulator::from_netlist(".circuit x\n"),
        Err(LogicError::ParseError { .. })
    ));
    assert!(matches!(
        Simulator::from_netlist("CLOCK c out freq=0\n"),
        Err(LogicError::InvalidParameter { .. })
    ));
    assert!(matches!(
        Simulator::from_netlist("CLOCK c out freq=1e20\n"),
        Err(LogicError::InvalidParameter { .. })
    ));
}

use std::time::{Duration, Instant};
use turing_sim::{
    MachineDefinition, MachineError, Phase, ProgramManager, Simulator, TuringMachine, Verdict,
};

fn machine_for(id: &str, input: &str) -> TuringMachine {
    let example = ProgramManager::get_example_by_id(id).expect("example exists");
    let mut machine = TuringMachine::new(example.definition).expect("example is valid");
    machine.load_input(input).expect("machine is idle");
    machine
}

fn run_to_verdict(id: &str, input: &str) -> (TuringMachine, Verdict) {
    let mut machine = machine_for(id, input);
    let verdict = machine
        .run(10_000)
        .expect("machine is idle")
        .expect("machine halts");
    (machine, verdict)
}

#[test]
fn binary_increment_of_101_is_110() {
    let (machine, verdict) = run_to_verdict("binary-increment", "101");

    assert_eq!(verdict, Verdict::Accepted);
    assert_eq!(machine.tape().contents().as_deref(), Some("110"));
    assert_eq!(machine.head(), 1);
}

#[test]
fn binary_increment_sample_inputs() {
    let cases = [("110", "111"), ("111", "1000"), ("1010", "1011"), ("", "1")];

    for (input, expected) in cases {
        let (machine, verdict) = run_to_verdict("binary-increment", input);
        assert_eq!(verdict, Verdict::Accepted, "input {:?}", input);
        assert_eq!(machine.tape().contents().as_deref(), Some(expected), "input {:?}", input);
    }
}

#[test]
fn palindrome_checker_verdicts() {
    let cases = [
        ("101", Verdict::Accepted),
        ("10", Verdict::Rejected),
        ("", Verdict::Accepted),
        ("1", Verdict::Accepted),
        ("0110", Verdict::Accepted),
        ("11011", Verdict::Accepted),
        ("1101", Verdict::Rejected),
        ("0111", Verdict::Rejected),
    ];

    for (input, expected) in cases {
        let (_, verdict) = run_to_verdict("palindrome-checker", input);
        assert_eq!(verdict, expected, "input {:?}", input);
    }
}

#[test]
fn unary_addition_sums() {
    let (machine, verdict) = run_to_verdict("unary-addition", "11+111");

    assert_eq!(verdict, Verdict::Accepted);
    assert_eq!(machine.tape().contents().as_deref(), Some("11111"));
}

#[test]
fn unary_addition_without_operator_rejects() {
    let (_, verdict) = run_to_verdict("unary-addition", "111");
    assert_eq!(verdict, Verdict::Rejected);
}

#[test]
fn zero_rule_machine_halts_on_first_step() {
    let mut machine = TuringMachine::new(MachineDefinition::new("Bare", "q0", '_')).unwrap();
    machine.load_input("anything").unwrap();

    let record = machine.step().unwrap().expect("a step was taken");

    assert_eq!(record.verdict, Some(Verdict::Rejected));
    assert_eq!(machine.verdict(), Some(Verdict::Rejected));
    assert_eq!(machine.step_count(), 1);
}

#[test]
fn replaying_after_reset_is_deterministic() {
    let mut machine = machine_for("palindrome-checker", "10101");

    let mut first = Vec::new();
    while !machine.is_halted() {
        machine.step().unwrap();
        first.push(machine.snapshot());
    }

    machine.reset();
    let mut second = Vec::new();
    for _ in 0..first.len() {
        machine.step().unwrap();
        second.push(machine.snapshot());
    }

    assert_eq!(first, second);
}

#[test]
fn snapshots_survive_later_steps() {
    let mut machine = machine_for("palindrome-checker", "101");
    let initial = machine.snapshot();

    machine.run(10_000).unwrap();

    assert_eq!(initial.tape.contents().as_deref(), Some("101"));
    assert_eq!(initial.steps, 0);
    assert_ne!(machine.tape(), &initial.tape);
}

#[test]
fn simulator_drives_example_to_halt() {
    let example = ProgramManager::get_example_by_id("binary-increment").unwrap();
    let mut sim = Simulator::new(example.definition).unwrap();
    sim.load_input("1011").unwrap();
    sim.set_speed(Duration::from_millis(10));

    let mut now = Instant::now();
    assert!(sim.play(now));
    while let Some(deadline) = sim.next_deadline() {
        now = deadline;
        sim.tick(now);
    }

    assert_eq!(sim.phase(), Phase::Halted);
    assert_eq!(sim.machine().verdict(), Some(Verdict::Accepted));
    assert_eq!(sim.machine().tape().contents().as_deref(), Some("1100"));
}

#[test]
fn start_then_stop_executes_nothing() {
    let example = ProgramManager::get_example_by_id("unary-addition").unwrap();
    let mut sim = Simulator::new(example.definition).unwrap();
    sim.load_input("1+1").unwrap();

    let now = Instant::now();
    sim.play(now);
    sim.pause();

    assert_eq!(sim.tick(now + Duration::from_secs(60)), None);
    assert_eq!(sim.machine().step_count(), 0);
}

#[test]
fn loading_definition_while_running_is_rejected() {
    let example = ProgramManager::get_example_by_id("unary-addition").unwrap();
    let mut sim = Simulator::new(example.definition.clone()).unwrap();
    sim.play(Instant::now());

    let result = sim.load_definition(example.definition);
    assert!(matches!(result, Err(MachineError::InvalidPhase { .. })));
    assert_eq!(sim.phase(), Phase::Running);
}

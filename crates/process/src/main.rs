use clap::Parser;
use process::{ProcessRegistry, ProcessState};
use sim_rng::SimRng;

#[derive(Parser)]
#[command(name = "process", about = "Spawn a process and run it to completion")]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 0.3)]
    io_probability: f64,
}

fn main() {
    let args = Args::parse();
    let mut rng = SimRng::new(args.seed);
    let mut registry = ProcessRegistry::new();

    let pid = registry
        .spawn(&mut rng, 0, args.io_probability, None, Some("demo".into()))
        .expect("valid process parameters");

    println!("Spawned process {pid}");

    loop {
        registry.set_state(pid, ProcessState::Running).unwrap();
        let p = registry.get_mut(pid).unwrap();
        let ran = p.run_for(&mut rng, 3).unwrap();
        println!(
            "pid {pid} ran for {ran} ticks, remaining={}, state={:?}",
            p.time_to_completion, p.state
        );
        if p.is_terminated() {
            registry.remove(pid);
            break;
        }
        // A standalone demo has no I/O manager; WAITING just flips back to ready.
        registry.set_state(pid, ProcessState::Ready).unwrap();
    }

    println!("Process {pid} terminated.");
}

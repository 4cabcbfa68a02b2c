use clap::Parser;
use io_manager::IoManager;
use process::{ProcessRegistry, ProcessState};
use sim_rng::SimRng;

#[derive(Parser)]
#[command(name = "io-manager", about = "Park a few processes on the I/O queue and drain them")]
struct Args {
    #[arg(short, long, default_value_t = 7)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    let mut rng = SimRng::new(args.seed);
    let mut registry = ProcessRegistry::new();
    let mut io = IoManager::new();

    let pids: Vec<u32> = (0..3)
        .map(|_| registry.spawn(&mut rng, 0, 1.0, Some(10), None).unwrap())
        .collect();
    for &pid in &pids {
        registry.set_state(pid, ProcessState::Waiting).unwrap();
        let completion = io.park(&registry, &mut rng, pid, 0).unwrap();
        println!("parked pid {pid}, completes at tick {completion}");
    }

    let mut clock = 0u64;
    while !io.is_empty() {
        clock += 1;
        for pid in io.drain(&mut registry, clock) {
            println!("tick {clock}: pid {pid} is READY");
        }
    }
}

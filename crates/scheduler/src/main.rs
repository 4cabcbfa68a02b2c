use clap::{Parser, ValueEnum};
use process::{ProcessRegistry, ProcessState};
use scheduler::{Cfs, Lottery, Mlfq, RoundRobin, Scheduler, Simple};
use sim_rng::SimRng;

#[derive(Copy, Clone, ValueEnum)]
enum Variant {
    Simple,
    #[value(name = "rr")]
    RoundRobin,
    Mlfq,
    Lottery,
    Cfs,
}

#[derive(Parser)]
#[command(name = "scheduler", about = "Run a few processes through one scheduler variant, no I/O")]
struct Args {
    #[arg(long, value_enum, default_value = "rr")]
    scheduler: Variant,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,
}

fn main() {
    let args = Args::parse();
    let mut rng = SimRng::new(args.seed);
    let mut registry = ProcessRegistry::new();

    let mut sched: Box<dyn Scheduler> = match args.scheduler {
        Variant::Simple => Box::new(Simple::new()),
        Variant::RoundRobin => Box::new(RoundRobin::new(3)),
        Variant::Mlfq => Box::new(Mlfq::default()),
        Variant::Lottery => Box::new(Lottery::new(5)),
        Variant::Cfs => Box::new(Cfs::default()),
    };

    let pids: Vec<u32> = (0..3)
        .map(|_| registry.spawn(&mut rng, 0, 0.0, None, None).unwrap())
        .collect();
    for &pid in &pids {
        sched.admit(&registry, pid, 0).unwrap();
    }

    let mut now = 0u64;
    while sched.has_work() {
        let pid = sched.pick_next(&mut registry, now, &mut rng).unwrap();
        registry.set_state(pid, ProcessState::Running).unwrap();
        let quantum = sched.quantum_for(&registry, pid);
        let p = registry.get_mut(pid).unwrap();
        let ran = p.run_for(&mut rng, quantum).unwrap();
        now += ran;
        println!("{now}: pid {pid} ran {ran} ticks via {}", sched.name());
        if p.is_terminated() {
            registry.remove(pid);
        } else {
            registry.set_state(pid, ProcessState::Ready).unwrap();
            sched.admit(&registry, pid, now).unwrap();
        }
    }
    println!("all processes terminated at tick {now}");
}

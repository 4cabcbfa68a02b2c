use clap::{Parser, ValueEnum};
use dispatcher::Cpu;
use io_manager::IoManager;
use process::ProcessRegistry;
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
#[command(name = "dispatcher", about = "Run a batch of processes with I/O to completion and print the trace")]
struct Args {
    #[arg(long, value_enum, default_value = "rr")]
    scheduler: Variant,

    #[arg(short, long, default_value_t = 7)]
    seed: u64,

    #[arg(short, long, default_value_t = 4)]
    processes: u32,

    #[arg(long, default_value_t = 0.3)]
    io_probability: f64,
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

    for _ in 0..args.processes {
        let pid = registry.spawn(&mut rng, 0, args.io_probability, None, None).unwrap();
        sched.admit(&registry, pid, 0).unwrap();
    }

    let mut io = IoManager::new();
    let mut cpu = Cpu::new();
    let trace = cpu
        .run(&mut registry, sched.as_mut(), &mut io, &mut rng, |event| {
            println!("tick {}: pid {} ran {} ticks", event.tick, event.pid, event.ran);
        })
        .unwrap();

    println!("simulation finished at tick {} after {} dispatches", cpu.clock(), trace.len());
}

use clap::{Parser, ValueEnum};
use heap_allocator::{BuddyAllocator, Fit, FitAllocator, HeapAllocator};

#[derive(Copy, Clone, ValueEnum)]
enum Policy {
    First,
    Best,
    Worst,
    Buddy,
}

#[derive(Parser)]
#[command(name = "heap-allocator", about = "Allocate and free a few blocks against one allocator policy")]
struct Args {
    #[arg(long, value_enum, default_value = "first")]
    policy: Policy,

    #[arg(short, long, default_value_t = 256)]
    arena: usize,
}

fn main() {
    let args = Args::parse();
    let mut alloc: Box<dyn HeapAllocator> = match args.policy {
        Policy::First => Box::new(FitAllocator::new(Fit::First, args.arena)),
        Policy::Best => Box::new(FitAllocator::new(Fit::Best, args.arena)),
        Policy::Worst => Box::new(FitAllocator::new(Fit::Worst, args.arena)),
        Policy::Buddy => Box::new(
            BuddyAllocator::new(args.arena).expect("arena must be a power of two for buddy allocation"),
        ),
    };

    let a = alloc.malloc(16).unwrap();
    let b = alloc.malloc(32).unwrap();
    println!("allocated a at {a}, b at {b}");
    alloc.free(a).unwrap();
    println!("freed a; total arena is {} bytes", alloc.total_memory());
    let c = alloc.malloc(8).unwrap();
    println!("allocated c at {c}");
}

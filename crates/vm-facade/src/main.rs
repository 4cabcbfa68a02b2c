use clap::{Parser, ValueEnum};
use vm_facade::{BaseAndBound, Paging, Segmented};

#[derive(Copy, Clone, ValueEnum)]
enum Scheme {
    BaseAndBound,
    Segmented,
    Paging,
}

#[derive(Parser)]
#[command(name = "vm-facade", about = "Translate a few virtual addresses under one address-translation scheme")]
struct Args {
    #[arg(long, value_enum, default_value = "base-and-bound")]
    scheme: Scheme,
}

fn main() {
    let args = Args::parse();
    match args.scheme {
        Scheme::BaseAndBound => {
            let mut vm = BaseAndBound::new(256);
            vm.allocate(1, 16).unwrap();
            let physical = vm.retrieve(1, 4).unwrap();
            println!("pid 1, va 4 -> physical address {physical}");
        }
        Scheme::Segmented => {
            let mut vm = Segmented::new(256);
            vm.allocate(1, 12).unwrap();
            for va in [0usize, 4, 8] {
                let physical = vm.retrieve(1, va).unwrap();
                println!("pid 1, va {va} -> physical address {physical}");
            }
        }
        Scheme::Paging => {
            let mut vm = Paging::new();
            vm.register_process(1);
            for va in [0usize, 4, 8] {
                let byte = vm.retrieve(1, va).unwrap();
                println!("pid 1, va {va} -> byte {byte} (page faulted in from disk if first touch)");
            }
        }
    }
}

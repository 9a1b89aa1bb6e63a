use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sable::dimacs::serialize_cnf;
use sable::generator::{random_formula, GeneratorParams};
use sable::solver::config::Config;
use sable::solver::{Outcome, Solver};
use std::path::Path;

#[derive(Parser)]
#[command(author, version, about = "random CNF formula generator", long_about = None)]
struct Args {
    num_vars: usize,
    num_clauses: usize,
    /// Smallest clause length
    min_len: usize,
    /// Largest clause length
    max_len: usize,
    /// How many formulas to generate
    num_files: usize,

    /// Output directory
    #[arg(short, long, default_value = "cnf-out")]
    out: String,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Skip the `c SAT` / `c UNSAT` label comment (the label is computed
    /// by solving each generated formula)
    #[arg(long)]
    no_label: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let params = GeneratorParams {
        num_vars: args.num_vars,
        num_clauses: args.num_clauses,
        min_len: args.min_len,
        max_len: args.max_len,
    };
    if let Err(reason) = params.validate() {
        eprintln!("error: {reason}");
        std::process::exit(1);
    }
    if let Err(err) = std::fs::create_dir_all(&args.out) {
        eprintln!("error: cannot create {}: {err}", args.out);
        std::process::exit(1);
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    for index in 0..args.num_files {
        let formula = random_formula(&params, &mut rng);

        let mut content = String::new();
        if !args.no_label {
            let label = match Solver::from_formula(formula.clone(), Config::default()).solve() {
                Outcome::Sat(_) => "SAT",
                Outcome::Unsat => "UNSAT",
                Outcome::Unknown => "UNKNOWN",
            };
            content.push_str(&format!("c {label}\n"));
        }
        content.push_str(&serialize_cnf(&formula));

        let file_name = format!(
            "random_{}v_{}c_{:03}.cnf",
            args.num_vars, args.num_clauses, index
        );
        let path = Path::new(&args.out).join(file_name);
        if let Err(err) = std::fs::write(&path, content) {
            eprintln!("error: cannot write {}: {err}", path.display());
            std::process::exit(1);
        }
        log::info!("wrote {}", path.display());
    }
}

use clap::Parser;
use colored::Colorize;
use prettytable::{row, Table};
use sable::cnf::check_assignment;
use sable::dimacs::{assignment_line, formula_from_file, Formula};
use sable::solver::config::Config;
use sable::solver::heuristic::HeuristicType;
use sable::solver::restarts::RestartPolicy;
use sable::solver::{Outcome, Solver};
use walkdir::WalkDir;

const EXIT_SAT: i32 = 10;
const EXIT_UNSAT: i32 = 20;
const EXIT_ERROR: i32 = 1;

#[derive(Parser)]
#[command(author, version, about = "CDCL SAT solver", long_about = None)]
struct Args {
    /// DIMACS CNF input, plain or gzipped
    #[arg(index = 1, default_value = "test.cnf")]
    file: String,

    #[arg(long, default_value = "vsids")]
    heuristic: HeuristicType,

    #[arg(short, long, default_value = "luby")]
    restarts: RestartPolicy,

    /// Conflict budget; the search reports UNKNOWN when it runs out
    #[arg(long)]
    max_conflicts: Option<usize>,

    /// Print solver statistics as comment lines
    #[arg(long)]
    stats: bool,

    /// Solve every .cnf / .cnf.gz file below a directory instead of a
    /// single file
    #[arg(long)]
    batch: Option<String>,
}

impl Args {
    fn config(&self) -> Config {
        Config::new(self.heuristic, self.restarts, self.max_conflicts)
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let exit_code = match &args.batch {
        Some(dir) => run_batch(dir, &args),
        None => run_single(&args),
    };
    std::process::exit(exit_code);
}

fn run_single(args: &Args) -> i32 {
    let formula = match formula_from_file(&args.file) {
        Ok(formula) => formula,
        Err(err) => {
            eprintln!("c {err}");
            return EXIT_ERROR;
        }
    };

    let mut solver = Solver::from_formula(formula.clone(), args.config());
    let outcome = solver.solve();

    if args.stats {
        for line in solver.stats().to_table().to_string().lines() {
            println!("c {line}");
        }
    }

    match outcome {
        Outcome::Sat(assignment) => {
            if check_assignment(&formula.clauses, &assignment) {
                println!("c {}", "assignment verified".green());
            } else {
                println!("c {}", "ASSIGNMENT DOES NOT SATISFY THE FORMULA".red());
            }
            println!("SAT");
            println!("{}", assignment_line(&assignment, formula.num_vars));
            EXIT_SAT
        }
        Outcome::Unsat => {
            println!("UNSAT");
            EXIT_UNSAT
        }
        Outcome::Unknown => {
            println!("UNKNOWN");
            0
        }
    }
}

fn run_batch(dir: &str, args: &Args) -> i32 {
    let mut table = Table::new();
    table.set_titles(row![b -> "File", "Result", "Conflicts", "Time"]);
    let mut errors = 0;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
    {
        let path = entry.path().display().to_string();
        if !path.ends_with(".cnf") && !path.ends_with(".cnf.gz") {
            continue;
        }

        match formula_from_file(&path) {
            Ok(formula) => {
                let report = solve_one(formula, args);
                table.add_row(row![path, report.verdict, report.conflicts, report.time]);
            }
            Err(err) => {
                eprintln!("c {err}");
                errors += 1;
            }
        }
    }

    table.printstd();
    if errors > 0 {
        EXIT_ERROR
    } else {
        0
    }
}

struct BatchReport {
    verdict: colored::ColoredString,
    conflicts: usize,
    time: String,
}

fn solve_one(formula: Formula, args: &Args) -> BatchReport {
    let clauses = formula.clauses.clone();
    let mut solver = Solver::from_formula(formula, args.config());
    let verdict = match solver.solve() {
        Outcome::Sat(assignment) => {
            if check_assignment(&clauses, &assignment) {
                "SAT".green()
            } else {
                "SAT (bad model!)".red()
            }
        }
        Outcome::Unsat => "UNSAT".blue(),
        Outcome::Unknown => "UNKNOWN".yellow(),
    };
    BatchReport {
        verdict,
        conflicts: solver.stats().num_conflicts,
        time: format!("{:.3}s", solver.stats().time.as_secs_f32()),
    }
}

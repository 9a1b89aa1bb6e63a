use flate2::read::GzDecoder;
use itertools::Itertools;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::cnf::{Clause, Literal, VarId};

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

fn parse_error<T>(line: usize, reason: impl Into<String>) -> Result<T, DimacsError> {
    Err(DimacsError::Parse {
        line,
        reason: reason.into(),
    })
}

#[derive(Debug, Clone)]
pub struct Formula {
    pub num_vars: usize,
    pub clauses: Vec<Clause>,
}

pub fn formula_from_file(path: &str) -> Result<Formula, DimacsError> {
    let read = |path: &str| -> std::io::Result<String> {
        if path.ends_with(".gz") {
            let file = std::fs::File::open(path)?;
            let mut decoder = GzDecoder::new(file);
            let mut content = String::new();
            decoder.read_to_string(&mut content)?;
            Ok(content)
        } else {
            std::fs::read_to_string(Path::new(path))
        }
    };
    let content = read(path).map_err(|source| DimacsError::Io {
        path: path.to_string(),
        source,
    })?;
    formula_from_str(&content)
}

pub fn formula_from_str(input: &str) -> Result<Formula, DimacsError> {
    let mut header: Option<(usize, usize)> = None;
    let mut clauses: Vec<Vec<Literal>> = Vec::new();
    let mut current: Vec<Literal> = Vec::new();
    let mut last_line = 0;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = raw_line.trim();
        // '%' lines appear as filler in common benchmark suites
        if line.is_empty() || line.starts_with('c') || line.starts_with('%') {
            continue;
        }

        if line.starts_with('p') {
            if header.is_some() {
                return parse_error(line_no, "duplicate `p cnf` header");
            }
            let fields = line.split_whitespace().collect_vec();
            if fields.len() != 4 || fields[0] != "p" || fields[1] != "cnf" {
                return parse_error(line_no, "expected `p cnf <num_vars> <num_clauses>`");
            }
            let num_vars = fields[2]
                .parse::<usize>()
                .or_else(|_| parse_error(line_no, format!("invalid variable count `{}`", fields[2])))?;
            let num_clauses = fields[3]
                .parse::<usize>()
                .or_else(|_| parse_error(line_no, format!("invalid clause count `{}`", fields[3])))?;
            header = Some((num_vars, num_clauses));
            continue;
        }

        let Some((num_vars, _)) = header else {
            return parse_error(line_no, "clause data before `p cnf` header");
        };

        for token in line.split_whitespace() {
            let value = token
                .parse::<i32>()
                .or_else(|_| parse_error(line_no, format!("invalid literal `{token}`")))?;
            if value == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                let lit = Literal::new(value);
                if lit.id() > num_vars {
                    return parse_error(
                        line_no,
                        format!("literal {value} references a variable outside 1..={num_vars}"),
                    );
                }
                current.push(lit);
            }
        }
    }

    let Some((num_vars, num_clauses)) = header else {
        return parse_error(last_line, "missing `p cnf` header");
    };
    if !current.is_empty() {
        return parse_error(last_line, "last clause is not terminated by 0");
    }
    // SATLIB files end in a lone "0" after the declared clauses; drop that
    // sentinel, but keep genuine empty clauses that are accounted for.
    if clauses.len() == num_clauses + 1 && clauses.last().is_some_and(|clause| clause.is_empty()) {
        clauses.pop();
    }
    if clauses.len() != num_clauses {
        return parse_error(
            last_line,
            format!("header declares {} clauses, found {}", num_clauses, clauses.len()),
        );
    }

    // normalize: merge duplicate literals, drop tautologies
    for clause in clauses.iter_mut() {
        clause.sort();
        clause.dedup();
    }
    let clauses = clauses
        .into_iter()
        .map(Clause::from)
        .filter(|clause| !clause.is_tautology())
        .collect_vec();

    Ok(Formula { num_vars, clauses })
}

/// Renders a formula back to DIMACS. Parsing the result yields the same
/// clause set modulo clause and literal order.
pub fn serialize_cnf(formula: &Formula) -> String {
    let mut out = format!("p cnf {} {}\n", formula.num_vars, formula.clauses.len());
    for clause in &formula.clauses {
        for lit in &clause.literals {
            out.push_str(&format!("{} ", lit));
        }
        out.push_str("0\n");
    }
    out
}

/// The competition-style assignment line: one signed integer per variable
/// in 1..=num_vars, terminated by 0. Unassigned variables default to false.
pub fn assignment_line(assignment: &HashMap<VarId, bool>, num_vars: usize) -> String {
    let mut line = String::new();
    for var in 1..=num_vars {
        let value = assignment.get(&var).copied().unwrap_or(false);
        line.push_str(&format!("{}{} ", if value { "" } else { "-" }, var));
    }
    line.push('0');
    line
}

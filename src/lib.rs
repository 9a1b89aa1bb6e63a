pub mod cnf;
pub mod dimacs;
pub mod generator;
pub mod solver;

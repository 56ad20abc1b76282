use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar/formula.pest"]
pub struct FormulaParser;

use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "asm65.pest"]
pub struct AsmParser;

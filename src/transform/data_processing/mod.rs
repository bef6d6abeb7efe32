pub mod casting;
pub mod parsing;

use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    hikmat::cli::main()
}

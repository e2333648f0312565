use log::error;
use std::{env, io};

use ticket_machine::{Operation, TicketMachine};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() != 3 {
        error!("Usage: ticket-replay <price> <operations.csv>");
        std::process::exit(1);
    }

    let mut machine = match args[1]
        .parse::<i64>()
        .map_err(|err| err.to_string())
        .and_then(|price| TicketMachine::new(price).map_err(|err| err.to_string()))
    {
        Ok(machine) => machine,
        Err(err) => {
            error!("Could not set up machine with price '{}': {}", args[1], err);
            std::process::exit(1);
        }
    };

    let file_path = std::path::Path::new(&args[2]);
    if !file_path.exists() {
        error!("File path does not exist");
        std::process::exit(1);
    }

    let mut reader = match csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(file_path)
    {
        Ok(reader) => reader,
        Err(err) => {
            error!("Could not read csv file: {}", err);
            std::process::exit(1);
        }
    };

    let operations = reader.deserialize::<Operation>().filter_map(|item| {
        if item.is_err() {
            error!("could not parse operation, will be skipped: {:?}", item)
        }
        item.ok()
    });

    machine.consume(operations);
    if let Err(err) = machine.write_results(io::stdout()) {
        error!("Unable to write results: {}", err);
        std::process::exit(1);
    }
}

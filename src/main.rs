use std::error::Error;
use std::fs;
use std::str::FromStr;

use clap::{Arg, ArgAction, ArgMatches, Command};

use log::info;

#[cfg(feature = "log_env_logger")]
use env_logger::Env;

#[cfg(feature = "log_log4rs")]
use log::LevelFilter;
#[cfg(feature = "log_log4rs")]
use log4rs::append::console::ConsoleAppender;
#[cfg(feature = "log_log4rs")]
use log4rs::append::file::FileAppender;
#[cfg(feature = "log_log4rs")]
use log4rs::config::{Appender, Config, Root};
#[cfg(feature = "log_log4rs")]
use log4rs::encode::pattern::PatternEncoder;

use ndarray_stats::QuantileExt;

use neuromind::cost::Cost;
use neuromind::dataloader::{load_json_dataset, DataLoader};
use neuromind::network::{LayerNetwork, DEFAULT_LEARN_RATE};
use neuromind::render::GraphSpec;
use neuromind::util::Float;

#[cfg(feature = "log_log4rs")]
fn init_logger() {
    let logfile_res = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::default()))
        .build("log.txt");

    let console_res = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::default()))
        .build();

    if let Ok(logfile) = logfile_res {
        let config = Config::builder()
            .appender(Appender::builder().build("logfile", Box::new(logfile)))
            .appender(Appender::builder().build("console", Box::new(console_res)))
            .build(
                Root::builder()
                    .appender("console")
                    .appender("logfile")
                    .build(LevelFilter::Info),
            )
            .unwrap();

        if log4rs::init_config(config).is_err() {
            panic!("Couldn't initialize logger !!!");
        }
    } else {
        panic!("Couldn't initialize logger !!!");
    }
}

#[cfg(feature = "log_env_logger")]
fn init_logger() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}

fn parse_sizes(arg: &str) -> Result<Vec<usize>, Box<dyn Error>> {
    let mut sizes = Vec::new();

    for part in arg.split(',') {
        sizes.push(part.trim().parse::<usize>()?);
    }

    Ok(sizes)
}

fn train(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let dataset_path = matches.get_one::<String>("Dataset").unwrap();
    let sizes = parse_sizes(matches.get_one::<String>("Sizes").unwrap())?;
    let iters = *matches.get_one::<usize>("MaxIter").unwrap();
    let learn_rate = *matches
        .get_one::<Float>("LearnRate")
        .unwrap_or(&DEFAULT_LEARN_RATE);
    let cost = Cost::from_str(matches.get_one::<String>("CostKind").unwrap())?;
    let state_out = matches.get_one::<String>("StateOut").unwrap();

    let classes = *sizes
        .last()
        .ok_or_else(|| "empty layer size list".to_owned())?;
    let dl = load_json_dataset(dataset_path, classes)?;

    let mut net = match matches.get_one::<u64>("Seed") {
        Some(seed) => LayerNetwork::new_seeded(sizes, cost, *seed)?,
        None => LayerNetwork::new(sizes, cost)?,
    };

    info!("Training {} network for {} iterations...", net, iters);

    for i in 0..iters {
        let entry = dl.next();
        net.train_step_with_rate(&entry.input, Some(&entry.expected), learn_rate)?;

        if i != 0 && i % 100 == 0 {
            info!("Iteration {}", i);
        }
    }

    net.save_state(state_out)?;
    info!("Saved network state to {}", state_out);

    Ok(())
}

fn eval(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let state_path = matches.get_one::<String>("ModelState").unwrap();
    let dataset_path = matches.get_one::<String>("Dataset").unwrap();

    let mut net = LayerNetwork::from_state_file(state_path)?;
    let classes = *net
        .size
        .last()
        .ok_or_else(|| "state file holds no layers".to_owned())?;

    let dl = load_json_dataset(dataset_path, classes)?;
    let total = dl.len().unwrap_or(0);

    let mut correct = 0usize;

    for _ in 0..total {
        let entry = dl.next();
        let (pos, confidence) = net.classify(&entry.input)?;
        let expected_pos = entry.expected.argmax()?;

        if pos == expected_pos {
            correct += 1;
        }

        info!(
            "Predicted class {} (confidence {:.3}), expected {}",
            pos, confidence, expected_pos
        );
    }

    info!(
        "Accuracy : {} / {} = {:.3}",
        correct,
        total,
        correct as Float / total as Float
    );

    Ok(())
}

fn render(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let state_path = matches.get_one::<String>("ModelState").unwrap();
    let out_path = matches.get_one::<String>("Out").unwrap();

    let net = LayerNetwork::from_state_file(state_path)?;
    let dot = GraphSpec::snapshot(&net).to_dot(Some(&format!("{}", net)));

    fs::write(out_path, dot)?;
    info!("Wrote graph to {}", out_path);

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logger();

    let matches = Command::new("neuromind")
        .version("0.1.0")
        .about("Train, evaluate and render scalar feed-forward networks")
        .subcommand_required(true)
        .subcommand(
            Command::new("train")
                .about("Train a network on a labeled JSON dataset")
                .arg(
                    Arg::new("Dataset")
                        .long("dataset")
                        .help("Path to a JSON dataset of {data, label} records")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new("Sizes")
                        .long("sizes")
                        .help("Comma-separated layer sizes, e.g. 784,16,16,10")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new("MaxIter")
                        .long("max_iter")
                        .help("Number of training examples to process")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1000"),
                )
                .arg(
                    Arg::new("Seed")
                        .long("seed")
                        .help("Seed for reproducible weight initialization")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("LearnRate")
                        .long("learn_rate")
                        .help("Gradient descent learning rate")
                        .action(ArgAction::Set)
                        .value_parser(clap::value_parser!(Float)),
                )
                .arg(
                    Arg::new("CostKind")
                        .long("cost")
                        .help("Cost function : quadratic | exponential")
                        .action(ArgAction::Set)
                        .default_value("quadratic"),
                )
                .arg(
                    Arg::new("StateOut")
                        .long("state_out")
                        .help("Where to save the trained network state")
                        .action(ArgAction::Set)
                        .default_value("network.state"),
                ),
        )
        .subcommand(
            Command::new("eval")
                .about("Classify a dataset with a saved network state")
                .arg(
                    Arg::new("ModelState")
                        .short('s')
                        .long("state")
                        .help("Path to a saved network state")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new("Dataset")
                        .long("dataset")
                        .help("Path to a JSON dataset of {data, label} records")
                        .action(ArgAction::Set)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("render")
                .about("Write a DOT graph of a saved network state")
                .arg(
                    Arg::new("ModelState")
                        .short('s')
                        .long("state")
                        .help("Path to a saved network state")
                        .action(ArgAction::Set)
                        .required(true),
                )
                .arg(
                    Arg::new("Out")
                        .long("out")
                        .help("Output DOT file path")
                        .action(ArgAction::Set)
                        .default_value("network.dot"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", m)) => train(m),
        Some(("eval", m)) => eval(m),
        Some(("render", m)) => render(m),
        _ => unreachable!(),
    }
}

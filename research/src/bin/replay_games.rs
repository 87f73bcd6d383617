use std::error::Error as StdError;
use std::io;

use clap::Parser as _;
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use whr::{Base, Evaluate, GameRecord};
use whr_research::record::RawGame;

#[derive(clap::Parser)]
struct Opt {
    /// Rating variance per elapsed day in Elo², one experiment per value.
    #[clap(long, value_delimiter = ',', num_args = 1.., default_value = "30,100,300,1000")]
    w2: Vec<f64>,
    /// First-day virtual draws, one experiment per value.
    #[clap(long, value_delimiter = ',', num_args = 1.., default_value = "2")]
    virtual_games: Vec<u32>,
    /// Fraction of the most recent games held out for evaluation.
    #[clap(long, default_value = "0.2")]
    holdout: f64,
}

struct Experiment {
    w2: f64,
    virtual_games: u32,
    sweeps: usize,
    held_out_log_likelihood: f64,
    leaders: Vec<(String, f64)>,
}

fn train(
    w2: f64,
    virtual_games: u32,
    train_games: &[GameRecord],
    test_games: &[GameRecord],
) -> Result<Experiment, Box<dyn StdError + Send + Sync>> {
    let mut base = Base::builder().w2(w2).virtual_games(virtual_games).build();
    base.create_games(train_games.iter().cloned())?;
    let sweeps = base.iterate_until_converge()?;
    let evaluate = Evaluate::new(&base);
    let held_out_log_likelihood = evaluate.average_log_likelihood(test_games, true);
    let leaders = base
        .ordered_ratings()
        .into_iter()
        .take(10)
        .map(|(name, history)| {
            let latest = history.last().map_or(0.0, |sample| f64::from(sample.elo));
            (name.to_owned(), latest)
        })
        .collect();
    Ok(Experiment {
        w2,
        virtual_games,
        sweeps,
        held_out_log_likelihood,
        leaders,
    })
}

fn main() -> Result<(), Box<dyn StdError>> {
    env_logger::init();
    let opt = Opt::parse();

    let mut games = Vec::new();
    let mut reader = csv::Reader::from_reader(io::stdin().lock());
    for raw in reader.deserialize() {
        let raw: RawGame = raw?;
        games.push(GameRecord::from(raw));
    }
    // Hold out the most recent slice of history.
    games.sort_by_key(|game| game.day);
    let held_out = ((games.len() as f64 * opt.holdout) as usize).min(games.len());
    let (train_games, test_games) = games.split_at(games.len() - held_out);

    let mut grid = Vec::new();
    for &w2 in &opt.w2 {
        for &virtual_games in &opt.virtual_games {
            grid.push((w2, virtual_games));
        }
    }

    let mut experiments = grid
        .par_iter()
        .map(|&(w2, virtual_games)| train(w2, virtual_games, train_games, test_games))
        .collect::<Result<Vec<_>, _>>()?;

    experiments.sort_by_key(|e| OrderedFloat(-e.held_out_log_likelihood));

    println!("w2,virtual_games,sweeps,held_out_ave_log_likelihood");
    for e in &experiments {
        println!(
            "{},{},{},{}",
            e.w2, e.virtual_games, e.sweeps, e.held_out_log_likelihood
        );
    }

    if let Some(best) = experiments.first() {
        println!("# ---");
        println!(
            "# best grid point: w2={} virtual_games={} ({} training games, {} held out)",
            best.w2,
            best.virtual_games,
            train_games.len(),
            test_games.len()
        );
        for (name, elo) in &best.leaders {
            println!("# {name}: {elo:.0}");
        }
    }

    Ok(())
}

use bio::io::fasta;
use plasmap::{
    FEATURE_LIBRARY,
    feature_import::parse_feature_lines,
    feature_store::FeatureStore,
    fragment_index::build_fragment_index,
    seed_match::{FeatureHit, SeedMatcher},
    seed_table::{parse_seed_table, seed_table_string},
};
use serde::Serialize;
use std::{env, fs, fs::File};

const DEFAULT_STORE_PATH: &str = ".plasmap_store.json";

#[derive(Serialize)]
struct CollectionSummary {
    name: String,
    feature_count: usize,
    indexed_strands: Option<usize>,
}

#[derive(Serialize)]
struct QueryResult {
    query: String,
    hits: Vec<FeatureHit>,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  plasmap_cli --version\n  \
  plasmap_cli [--store PATH] import COLLECTION [FILE]\n  \
  plasmap_cli [--store PATH] build-index COLLECTION [OUTPUT]\n  \
  plasmap_cli [--store PATH] annotate COLLECTION SEQUENCE|@FILE.fasta [TABLE]\n  \
  plasmap_cli [--store PATH] list\n\n  \
  import reads feature lines (E:<name>,<cut>/<cut> <seq> or <code>:<name> <seq>);\n  \
  without FILE the built-in library is imported.\n  \
  annotate rebuilds the index unless a previously emitted seed TABLE is given."
    );
}

fn load_store(path: &str) -> Result<FeatureStore, String> {
    if std::path::Path::new(path).exists() {
        FeatureStore::load_from_path(path).map_err(|e| e.to_string())
    } else {
        Ok(FeatureStore::new())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Could not serialize JSON output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn parse_global_store_arg(args: &[String]) -> (String, usize) {
    if args.len() >= 3 && args[1] == "--store" {
        return (args[2].clone(), 3);
    }
    (DEFAULT_STORE_PATH.to_string(), 1)
}

fn query_sequences(arg: &str) -> Result<Vec<(String, String)>, String> {
    if let Some(path) = arg.strip_prefix('@') {
        let file =
            File::open(path).map_err(|e| format!("Could not read FASTA file '{path}': {e}"))?;
        let mut ret = vec![];
        for record in fasta::Reader::new(file).records() {
            let record = record.map_err(|e| format!("Bad FASTA record in '{path}': {e}"))?;
            let sequence = String::from_utf8(record.seq().to_vec())
                .map_err(|e| format!("Non-UTF8 sequence in '{path}': {e}"))?;
            ret.push((record.id().to_string(), sequence));
        }
        Ok(ret)
    } else {
        Ok(vec![("query".to_string(), arg.to_string())])
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() <= 1 {
        usage();
        return Err("Missing command".to_string());
    }
    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!(
            "plasmap {}\nPlasmid feature mapper",
            env!("CARGO_PKG_VERSION")
        );
        return Ok(());
    }

    let (store_path, cmd_idx) = parse_global_store_arg(&args);
    if args.len() <= cmd_idx {
        usage();
        return Err("Missing command".to_string());
    }

    let command = &args[cmd_idx];

    match command.as_str() {
        "import" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing collection name for import".to_string());
            }
            let collection = &args[cmd_idx + 1];
            let features = match args.get(cmd_idx + 2) {
                Some(path) => {
                    let text = fs::read_to_string(path)
                        .map_err(|e| format!("Could not read feature file '{path}': {e}"))?;
                    parse_feature_lines(&text)
                }
                None => FEATURE_LIBRARY.clone(),
            };
            let count = features.len();
            let mut store = load_store(&store_path)?;
            for feature in features {
                let id = store.save_feature(feature);
                store.add_to_collection(collection, id);
            }
            store.save_to_path(&store_path).map_err(|e| e.to_string())?;
            println!("Imported {count} features into collection '{collection}'");
            Ok(())
        }
        "build-index" => {
            if args.len() <= cmd_idx + 1 {
                usage();
                return Err("Missing collection name for build-index".to_string());
            }
            let collection = &args[cmd_idx + 1];
            let mut store = load_store(&store_path)?;
            let records =
                build_fragment_index(&mut store, collection).map_err(|e| e.to_string())?;
            store.save_to_path(&store_path).map_err(|e| e.to_string())?;
            let table = seed_table_string(&records);
            match args.get(cmd_idx + 2) {
                Some(output) => {
                    fs::write(output, table)
                        .map_err(|e| format!("Could not write seed table '{output}': {e}"))?;
                    eprintln!(
                        "Indexed {} fragments of collection '{collection}' to '{output}'",
                        records.len()
                    );
                }
                None => print!("{table}"),
            }
            Ok(())
        }
        "annotate" => {
            if args.len() <= cmd_idx + 2 {
                usage();
                return Err("annotate requires: COLLECTION SEQUENCE|@FILE.fasta".to_string());
            }
            let collection = &args[cmd_idx + 1];
            let queries = query_sequences(&args[cmd_idx + 2])?;

            let mut store = load_store(&store_path)?;
            let records = match args.get(cmd_idx + 3) {
                Some(table) => {
                    let text = fs::read_to_string(table)
                        .map_err(|e| format!("Could not read seed table '{table}': {e}"))?;
                    parse_seed_table(&text).map_err(|e| e.to_string())?
                }
                None => {
                    let records =
                        build_fragment_index(&mut store, collection).map_err(|e| e.to_string())?;
                    store.save_to_path(&store_path).map_err(|e| e.to_string())?;
                    records
                }
            };

            let matcher = SeedMatcher::new(&records);
            let mut results = vec![];
            for (name, sequence) in queries {
                let hits = matcher
                    .find_hits(&store, collection, &sequence)
                    .map_err(|e| e.to_string())?;
                results.push(QueryResult { query: name, hits });
            }
            print_json(&results)
        }
        "list" => {
            let store = load_store(&store_path)?;
            let summaries: Vec<CollectionSummary> = store
                .collections()
                .iter()
                .map(|c| CollectionSummary {
                    name: c.name.clone(),
                    feature_count: c.members.len(),
                    indexed_strands: store.strand_entries(&c.name).ok().map(|e| e.len()),
                })
                .collect();
            print_json(&summaries)
        }
        _ => {
            usage();
            Err(format!("Unknown command '{command}'"))
        }
    }
}

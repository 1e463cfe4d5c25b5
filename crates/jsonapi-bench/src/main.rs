//! Benchmark for document marshaling using city data.
//!
//! Builds a country -> state -> city record graph and times marshal and
//! unmarshal in both topologies. Without a data file a synthetic graph of
//! the same shape is generated.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use jsonapi::{
    Field, MarshalOptions, Resource, encode_document, marshal_many, unmarshal_many,
};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

// =============================================================================
// JSON DATA STRUCTURES
// =============================================================================

#[derive(Debug, Deserialize)]
struct CityRow {
    id: u32,
    name: String,
    state_id: u32,
    state_code: String,
    state_name: String,
    country_id: u32,
    country_code: String,
    country_name: String,
    latitude: String,
    longitude: String,
    population: Option<i64>,
    timezone: Option<String>,
    #[serde(rename = "wikiDataId")]
    wikidata_id: Option<String>,
}

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
struct Country {
    id: u32,
    code: String,
    name: String,
    states: Vec<State>,
}

impl Resource for Country {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,countries", |c: &Country| &c.id, |c| &mut c.id),
            Field::attr("attr,code", |c: &Country| &c.code, |c| &mut c.code),
            Field::attr("attr,name", |c: &Country| &c.name, |c| &mut c.name),
            Field::to_many("relation,states", |c: &Country| &c.states, |c| &mut c.states),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct State {
    id: u32,
    code: String,
    name: String,
    cities: Vec<City>,
}

impl Resource for State {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,states", |s: &State| &s.id, |s| &mut s.id),
            Field::attr("attr,code", |s: &State| &s.code, |s| &mut s.code),
            Field::attr("attr,name", |s: &State| &s.name, |s| &mut s.name),
            Field::to_many("relation,cities", |s: &State| &s.cities, |s| &mut s.cities),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct City {
    id: u32,
    name: String,
    latitude: f64,
    longitude: f64,
    population: Option<i64>,
    timezone: Option<String>,
    wikidata_id: Option<String>,
}

impl Resource for City {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,cities", |c: &City| &c.id, |c| &mut c.id),
            Field::attr("attr,name", |c: &City| &c.name, |c| &mut c.name),
            Field::attr("attr,latitude", |c: &City| &c.latitude, |c| &mut c.latitude),
            Field::attr("attr,longitude", |c: &City| &c.longitude, |c| &mut c.longitude),
            Field::attr("attr,population,omitempty", |c: &City| &c.population, |c| {
                &mut c.population
            }),
            Field::attr("attr,timezone,omitempty", |c: &City| &c.timezone, |c| &mut c.timezone),
            Field::attr("attr,wikiDataId,omitempty", |c: &City| &c.wikidata_id, |c| {
                &mut c.wikidata_id
            }),
        ]
    }
}

// =============================================================================
// GRAPH CONSTRUCTION
// =============================================================================

fn group_rows(rows: Vec<CityRow>) -> Vec<Country> {
    let mut countries: BTreeMap<u32, Country> = BTreeMap::new();
    let mut states: BTreeMap<(u32, u32), State> = BTreeMap::new();

    for row in rows {
        countries.entry(row.country_id).or_insert_with(|| Country {
            id: row.country_id,
            code: row.country_code.clone(),
            name: row.country_name.clone(),
            states: Vec::new(),
        });
        let state = states
            .entry((row.country_id, row.state_id))
            .or_insert_with(|| State {
                id: row.state_id,
                code: row.state_code.clone(),
                name: row.state_name.clone(),
                cities: Vec::new(),
            });
        state.cities.push(City {
            id: row.id,
            name: row.name,
            latitude: row.latitude.parse().unwrap_or_default(),
            longitude: row.longitude.parse().unwrap_or_default(),
            population: row.population,
            timezone: row.timezone,
            wikidata_id: row.wikidata_id,
        });
    }

    for ((country_id, _), state) in states {
        if let Some(country) = countries.get_mut(&country_id) {
            country.states.push(state);
        }
    }
    countries.into_values().collect()
}

fn synthetic_graph(countries: u32, states_per: u32, cities_per: u32) -> Vec<Country> {
    (1..=countries)
        .map(|c| Country {
            id: c,
            code: format!("C{c}"),
            name: format!("Country {c}"),
            states: (1..=states_per)
                .map(|s| {
                    let state_id = c * 1_000 + s;
                    State {
                        id: state_id,
                        code: format!("S{s}"),
                        name: format!("State {state_id}"),
                        cities: (1..=cities_per)
                            .map(|i| City {
                                id: state_id * 1_000 + i,
                                name: format!("City {i}"),
                                latitude: f64::from(i) * 0.5,
                                longitude: f64::from(s) * -0.25,
                                population: (i % 3 != 0).then_some(i64::from(i) * 1_000),
                                timezone: Some("UTC".to_string()),
                                wikidata_id: None,
                            })
                            .collect(),
                    }
                })
                .collect(),
        })
        .collect()
}

fn load_countries(data_path: &str) -> Vec<Country> {
    if !Path::new(data_path).exists() {
        println!("{} not found, generating a synthetic graph", data_path);
        return synthetic_graph(50, 40, 75);
    }

    let json_data = fs::read_to_string(data_path).expect("Failed to read cities.json");
    let parse_start = Instant::now();
    let rows: Vec<CityRow> = serde_json::from_str(&json_data).expect("Failed to parse JSON");
    println!("Loaded {} cities in {:?}", rows.len(), parse_start.elapsed());
    group_rows(rows)
}

// =============================================================================
// BENCHMARK
// =============================================================================

fn throughput(bytes: usize, elapsed: Duration) -> f64 {
    (bytes as f64 / 1_000_000.0) / elapsed.as_secs_f64()
}

fn bench_topology(label: &str, countries: &[Country], options: MarshalOptions) {
    let marshal_start = Instant::now();
    let document = marshal_many(countries, options).expect("Failed to marshal");
    let marshal_time = marshal_start.elapsed();

    let mut encoded = Vec::new();
    let encode_start = Instant::now();
    encode_document(&mut encoded, &document, false).expect("Failed to encode");
    let encode_time = encode_start.elapsed();

    println!("\n=== {} ===", label);
    println!(
        "Marshal: {} primary, {} included in {:?}",
        document.data.nodes().len(),
        document.included.len(),
        marshal_time
    );
    println!(
        "Encode: {} bytes in {:?} ({:.2} MB/s)",
        encoded.len(),
        encode_time,
        throughput(encoded.len(), encode_time)
    );

    let decode_start = Instant::now();
    let decoded: Vec<Country> = unmarshal_many(encoded.as_slice()).expect("Failed to unmarshal");
    let decode_time = decode_start.elapsed();
    println!(
        "Unmarshal: {} records in {:?} ({:.2} MB/s)",
        decoded.len(),
        decode_time,
        throughput(encoded.len(), decode_time)
    );

    assert_eq!(decoded.as_slice(), countries, "round trip changed the graph");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "../../../out/cities.json".to_string());

    println!("Loading cities from: {}", data_path);
    let countries = load_countries(&data_path);

    let state_count: usize = countries.iter().map(|c| c.states.len()).sum();
    let city_count: usize = countries
        .iter()
        .flat_map(|c| &c.states)
        .map(|s| s.cities.len())
        .sum();
    println!(
        "Graph: {} countries, {} states, {} cities",
        countries.len(),
        state_count,
        city_count
    );

    bench_topology("Sideloaded", &countries, MarshalOptions::sideloaded());
    bench_topology("Embedded", &countries, MarshalOptions::embedded());
}

//! Simple inspector for JSON:API documents.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use jsonapi::{Data, Node, decode_document};

fn format_node(node: &Node) -> String {
    if node.id.is_empty() && !node.client_id.is_empty() {
        format!("{} (client-id {})", node.resource_type, node.client_id)
    } else {
        format!("{} {}", node.resource_type, node.id)
    }
}

fn format_data(data: &Data) -> String {
    match data {
        Data::One(None) => "null".to_string(),
        Data::One(Some(node)) => format_node(node),
        Data::Many(nodes) => format!("[{} nodes]", nodes.len()),
    }
}

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "document.json".to_string());

    println!("Reading: {}", path);

    let file = File::open(&path).expect("Failed to open file");
    let document = decode_document(BufReader::new(file)).expect("Failed to decode");

    println!("\n=== Primary Data ===");
    let primary = document.data.nodes();
    println!("Kind: {}", if document.is_many() { "list" } else { "single" });
    println!("Nodes: {}", primary.len());

    println!("\n=== Included ({}) ===", document.included.len());
    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for node in &document.included {
        *by_type.entry(node.resource_type.as_str()).or_default() += 1;
    }
    for (resource_type, count) in &by_type {
        println!("  {}: {}", resource_type, count);
    }

    // Show first few primary nodes in detail
    println!("\n=== First 20 Nodes (detail) ===");
    for (i, node) in primary.iter().take(20).enumerate() {
        println!("[{}] {}", i, format_node(node));
        for (name, value) in node.attributes.iter().take(5) {
            let text = value.to_string();
            let preview: String = text.chars().take(80).collect();
            println!("      {} = {}", name, preview);
        }
        if node.attributes.len() > 5 {
            println!("      ... and {} more attributes", node.attributes.len() - 5);
        }
        for (name, relationship) in &node.relationships {
            println!("      -> {}: {}", name, format_data(&relationship.data));
        }
    }
}

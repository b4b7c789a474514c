//! Graphviz dump of a roadmap, for eyeballing connectivity

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::spatial::SpatialGraph;

/// Write `graph` as an undirected dot graph with node ids and edge weights
pub fn write_graph<W: Write>(graph: &SpatialGraph, out: &mut W) -> io::Result<()> {
    writeln!(out, "graph G {{")?;
    for node in graph.nodes() {
        writeln!(out, "{} [node_id={}];", node.id, node.id)?;
    }
    for (u, v, weight) in graph.edges() {
        writeln!(out, "{}--{} [edge_weight={}];", u, v, weight)?;
    }
    writeln!(out, "}}")
}

/// Write `graph` to a dot file at `path`
pub fn save_graph<P: AsRef<Path>>(graph: &SpatialGraph, path: P) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_graph(graph, &mut out)?;
    out.flush()
}

fn main() {
    portgraph::cli::run();
}

use bifmindex::{BiFmIndexConfig, alphabet};
use bifmindex::search_schemes::generator;
use bifmindex::searcher::{Distance, Searcher};

fn main() {
    // This example shows how to use the bidirectional FM-index in a basic way.

    let dna_n_alphabet = alphabet::ascii_dna_with_n();
    let texts = [b"aACGT".as_slice(), b"acGtn"];

    let index = BiFmIndexConfig::<i32>::new()
        .suffix_array_sampling_rate(2)
        .lookup_table_depth(0)
        .construct_index(texts, dna_n_alphabet)
        .unwrap();

    let query = b"GT";
    assert_eq!(index.count(query), 2);

    for hit in index.locate(query) {
        println!(
            "Found query in text {} at position {}.",
            hit.text_id, hit.position
        );
    }

    // For approximate search, a scheme is generated for the query length and run
    // through a Searcher under a distance model.
    let scheme = generator::backtracking(query.len(), 0, 1);
    let searcher = Searcher::new(&index);

    let matches = searcher
        .search_collect(&[query.as_slice()], &scheme, &Distance::Hamming)
        .unwrap();

    for m in matches {
        println!(
            "Found query with {} error(s) in text {} at position {}.",
            m.errors, m.hit.text_id, m.hit.position
        );
    }
}

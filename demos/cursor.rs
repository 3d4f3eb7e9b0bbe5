use bifmindex::{BiFmIndexConfig, alphabet};

fn main() {
    // This example showcases the flexible bidirectional cursor API of this library.

    let dna_n_alphabet = alphabet::ascii_dna_with_n();
    let texts = [b"AaACGT".as_slice(), b"AacGtn", b"GTGTGT"];

    let index = BiFmIndexConfig::<i32>::new()
        .construct_index(texts, dna_n_alphabet)
        .unwrap();

    let query = b"GT";

    // We obtain a cursor pointing at the index with `query` already searched. Symbols
    // can iteratively be added to either side of the currently searched range.
    let mut cursor = index.cursor_for_query(query);

    // There are too many occurrences for our taste.
    assert_eq!(cursor.count(), 5);

    // So we extend the currently searched query on the right.
    cursor.extend_right(b'G');
    assert_eq!(cursor.count(), 2);

    // And on the left.
    cursor.extend_left(b'T');

    // That's better!
    assert_eq!(cursor.count(), 1);

    for hit in cursor.locate() {
        println!(
            "Found query in text {} at position {}.",
            hit.text_id, hit.position
        );
    }
}

use bifmindex::{BiFmIndexConfig, Hit, alphabet};
use std::collections::HashSet;

fn create_index() -> bifmindex::BiFmIndex<i32> {
    let text = b"cccaaagggttt".as_slice();

    BiFmIndexConfig::<i32>::new()
        .suffix_array_sampling_rate(3)
        .construct_index([text], alphabet::ascii_dna())
        .unwrap()
}

fn create_index_u32_compressed() -> bifmindex::BiFmIndex<u32> {
    let text = b"cccaaagggttt".as_slice();

    BiFmIndexConfig::<u32>::new()
        .suffix_array_sampling_rate(3)
        .construct_index([text], alphabet::ascii_dna())
        .unwrap()
}

static BASIC_QUERY: &[u8] = b"gg";
static FRONT_QUERY: &[u8] = b"c";
static WRAPPING_QUERY: &[u8] = b"ta";
static MULTI_QUERY: &[u8] = b"gt";

#[test]
fn basic_search() {
    let index = create_index();
    let index_u32_compressed = create_index_u32_compressed();

    let results: HashSet<_> = index.locate(BASIC_QUERY).collect();
    let results_u32_compressed: HashSet<_> = index_u32_compressed.locate(BASIC_QUERY).collect();

    let expected_results = HashSet::from_iter([
        Hit {
            text_id: 0,
            position: 6,
        },
        Hit {
            text_id: 0,
            position: 7,
        },
    ]);

    assert_eq!(results, expected_results);
    assert_eq!(results_u32_compressed, expected_results);
}

#[test]
fn text_front_search() {
    let index = create_index();
    let index_u32_compressed = create_index_u32_compressed();

    let results: HashSet<_> = index.locate(FRONT_QUERY).collect();
    let results_u32_compressed: HashSet<_> = index_u32_compressed.locate(FRONT_QUERY).collect();

    let expected_results = HashSet::from_iter([
        Hit {
            text_id: 0,
            position: 0,
        },
        Hit {
            text_id: 0,
            position: 1,
        },
        Hit {
            text_id: 0,
            position: 2,
        },
    ]);

    assert_eq!(results, expected_results);
    assert_eq!(results_u32_compressed, expected_results);
}

#[test]
fn search_no_wrapping() {
    let index = create_index();
    let index_u32_compressed = create_index_u32_compressed();

    let results: HashSet<_> = index.locate(WRAPPING_QUERY).collect();
    let results_u32_compressed: HashSet<_> = index_u32_compressed.locate(WRAPPING_QUERY).collect();

    assert!(results.is_empty());
    assert!(results_u32_compressed.is_empty());
}

#[test]
fn search_multitext() {
    let texts = [b"cccaaagggttt".as_slice(), b"acgtacgtacgt"];

    let index = BiFmIndexConfig::<u32>::new()
        .suffix_array_sampling_rate(3)
        .construct_index(texts, alphabet::ascii_dna())
        .unwrap();

    let expected_results_basic_query = HashSet::from_iter([
        Hit {
            text_id: 0,
            position: 6,
        },
        Hit {
            text_id: 0,
            position: 7,
        },
    ]);

    let results_basic_query: HashSet<_> = index.locate(BASIC_QUERY).collect();
    assert_eq!(results_basic_query, expected_results_basic_query);

    let expected_results_multi_query = HashSet::from_iter([
        Hit {
            text_id: 0,
            position: 8,
        },
        Hit {
            text_id: 1,
            position: 2,
        },
        Hit {
            text_id: 1,
            position: 6,
        },
        Hit {
            text_id: 1,
            position: 10,
        },
    ]);

    let results_multi_query: HashSet<_> = index.locate(MULTI_QUERY).collect();
    assert_eq!(results_multi_query, expected_results_multi_query);
}

#[test]
fn hello_world_raw_byte_alphabet() {
    let texts = [b"Hello".as_slice(), b"World".as_slice()];

    let index = BiFmIndexConfig::<i32>::new()
        .suffix_array_sampling_rate(1)
        .construct_index(texts, alphabet::raw_bytes())
        .unwrap();

    assert_eq!(index.count(b"l"), 3);

    let results: HashSet<_> = index.locate(b"l").collect();
    let expected = HashSet::from_iter([
        Hit {
            text_id: 0,
            position: 2,
        },
        Hit {
            text_id: 0,
            position: 3,
        },
        Hit {
            text_id: 1,
            position: 3,
        },
    ]);

    assert_eq!(results, expected);
}

#[test]
fn bidirectional_extension_matches_spec_scenario() {
    // texts as raw dense symbols 1..=4 stored directly as bytes, sigma = 5
    let text_a: Vec<u8> = vec![1, 1, 1, 2, 2, 2, 3, 2, 4, 1, 1, 1];
    let text_b: Vec<u8> = vec![1, 2, 1, 2, 3, 4, 3];

    let mut table = [255u8; 256];
    table[1] = 1;
    table[2] = 2;
    table[3] = 3;
    table[4] = 4;
    let alph = alphabet::Alphabet::custom(table, 5, 4);

    let index = BiFmIndexConfig::<i32>::new()
        .suffix_array_sampling_rate(1)
        .construct_index([text_a.as_slice(), text_b.as_slice()], alph)
        .unwrap();

    let query = [2u8, 3u8];

    // extend right-to-left (standard backward search direction)
    let mut left_cursor = index.cursor_empty();
    left_cursor.extend_left(3);
    left_cursor.extend_left(2);

    // extend left-to-right, exercising extend_right instead
    let mut right_cursor = index.cursor_empty();
    right_cursor.extend_right(2);
    right_cursor.extend_right(3);

    let expected = HashSet::from_iter([
        Hit {
            text_id: 0,
            position: 5,
        },
        Hit {
            text_id: 1,
            position: 3,
        },
    ]);

    assert_eq!(left_cursor.count(), 2);
    assert_eq!(right_cursor.count(), 2);
    assert_eq!(left_cursor.locate().collect::<HashSet<_>>(), expected);
    assert_eq!(right_cursor.locate().collect::<HashSet<_>>(), expected);
    assert_eq!(index.locate(&query).collect::<HashSet<_>>(), expected);
}

#[test]
fn bidirectional_cursor_matches_locate() {
    let index = create_index();

    let mut cursor = index.cursor_empty();
    for &byte in MULTI_QUERY.iter().rev() {
        cursor.extend_left(byte);
    }

    let via_cursor: HashSet<_> = cursor.locate().collect();
    let via_locate: HashSet<_> = index.locate(MULTI_QUERY).collect();

    assert_eq!(via_cursor, via_locate);
}

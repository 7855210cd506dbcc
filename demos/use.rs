use std::env;
use std::process;

use word_index::{Kind, WordIndex};

const TOKENS: &[&str] = &[
    "b", "a", "c", "d", "e", "f", "f", "q", "z", "k", "k", "k", "v", "z", "u", "t", "h", "s", "y",
    "x", "w", "m", "p", "n", "l", "o", "z", "j", "s", "i", "r", "o", "g",
];

fn list(index: &dyn WordIndex) {
    if index.is_empty() {
        println!("Set is empty");
        return;
    }
    let listed: Vec<String> = index
        .entries()
        .map(|entry| format!("({}) {} {}", entry.rank, entry.token, entry.count))
        .collect();
    println!("Set contains: {}", listed.join(", "));
}

fn main() {
    let kind: Kind = match env::args().nth(1).as_deref().unwrap_or("bst").parse() {
        Ok(kind) => kind,
        Err(err) => {
            eprintln!("{err}");
            process::exit(2);
        }
    };

    let mut index = kind.build();
    list(&*index);

    for token in TOKENS {
        index.insert(token);
    }
    list(&*index);
    assert_eq!(index.get("k"), Some(3));
    assert_eq!(index.total(), TOKENS.len() as u64);
}

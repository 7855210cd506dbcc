use word_index::Kind;

const TEXT: &str = "\
It was the best of times, it was the worst of times, it was the age of wisdom, \
it was the age of foolishness, it was the epoch of belief, it was the epoch of \
incredulity, it was the season of Light, it was the season of Darkness, it was \
the spring of hope, it was the winter of despair.";

fn main() {
    let tokens: Vec<String> = TEXT
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect();

    println!("{:<10} {:>8} {:>8} {:>8}", "kind", "distinct", "total", "height");
    for kind in Kind::ALL {
        let mut index = kind.build_seeded(0);
        for token in &tokens {
            index.insert(token);
        }
        println!(
            "{:<10} {:>8} {:>8} {:>8}",
            kind.name(),
            index.len(),
            index.total(),
            index.height()
        );
    }

    let mut index = Kind::RedBlack.build();
    for token in &tokens {
        index.insert(token);
    }
    let mut frequent: Vec<_> = index.entries().collect();
    frequent.sort_by(|a, b| b.count.cmp(&a.count).then(a.rank.cmp(&b.rank)));
    println!();
    for entry in frequent.iter().take(5) {
        println!("{:<10} {:>8}", entry.token, entry.count);
    }
}

use avl_set::AvlTreeSet;

fn main() {
    let mut set = AvlTreeSet::new();
    for x in 0..5 {
        set.insert(x);
    }
    let (_, inserted) = set.insert(2);
    assert!(!inserted);
    assert!(set.contains(&1));
    set.remove(&1);
    assert!(!set.contains(&1));

    print!("{{ ");
    for x in &set {
        print!("{x}, ");
    }
    println!("}}");

    let words = AvlTreeSet::from(["the", "frogurt", "is", "also", "cursed"]);
    println!("{:?}", words);
    println!("height: {}", words.height());
}

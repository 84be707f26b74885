use avl_set::AvlTreeSet;

fn main() {
    let mut set: AvlTreeSet<i32> = (1..=7).collect();

    // Walk from the largest value down to the smallest
    let mut pos = set.predecessor(set.end());
    while !pos.is_end() {
        print!("{} ", set.key_at(pos).copied().unwrap_or_default());
        pos = set.predecessor(pos);
    }
    println!();

    // 4 sits at the root with two children, so 5 moves into its node
    let four = set.find(&4);
    let five = set.find(&5);
    set.erase(four);
    println!("old position of 4 now holds {:?}", set.key_at(four));
    println!("old position of 5 is valid: {}", set.is_valid(five));
    println!("erasing it again: {:?}", set.try_erase(five));

    let last = set.erase_range(set.find(&2), set.find(&6));
    println!("after erasing [2, 6): {:?}, next is {:?}", set, set.key_at(last));
}

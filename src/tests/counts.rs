use super::macros::*;
use crate::prelude::*;

#[test]
fn empty_tally() {
    let (registry, types) = registry!("A", "B", "C");
    let counts = ReactantCounts::tally(&registry, []).unwrap();
    assert!(counts.is_over(&registry));
    assert_eq!(counts.total(), 0);
    let keys = counts.iter().map(|(ty, _)| ty).collect::<Vec<_>>();
    assert_eq!(keys, types);
    assert!(counts.iter().all(|(_, n)| n == 0));
}

#[test]
fn tally() {
    let (registry, [a, b, c]) = registry!("A", "B", "C");
    let counts = ReactantCounts::tally(&registry, [a, b, a, a, b]).unwrap();
    assert_eq!(counts.get(a), Some(3));
    assert_eq!(counts.get(b), Some(2));
    assert_eq!(counts.get(c), Some(0));
    assert_eq!(counts.total(), 5);
    assert_eq!(counts.kinds(), 3);
}

#[test]
fn foreign_molecule() {
    let (registry, [a]) = registry!("A");
    let (_other, [x]) = registry!("X");
    assert_eq!(
        ReactantCounts::tally(&registry, [a, x]),
        Err(UndeclaredMolecule(x))
    );
    let counts = ReactantCounts::zeroed(&registry);
    assert_eq!(counts.get(x), None);
}

#[test]
fn concentrations() {
    let (registry, [a, b]) = registry!("A", "B");
    let counts = ReactantCounts::tally(&registry, [a, b, b, b]).unwrap();
    let conc = Concentrations::from_counts(&counts);
    assert_eq!(conc.get(a), Some(25.0));
    assert_eq!(conc.get(b), Some(75.0));
    assert!((conc.sum() - 100.0).abs() < 1e-9);

    let empty = Concentrations::from_counts(&ReactantCounts::zeroed(&registry));
    assert_eq!(empty.values(), [0.0, 0.0]);
}

#[test]
fn add_overflow() {
    let (registry, [a, b]) = registry!("A", "B");
    let (_other, [x]) = registry!("X");
    let mut counts = ReactantCounts::zeroed(&registry);
    counts.add(a, usize::MAX).unwrap();
    assert_eq!(counts.add(a, 1), Err(CountError::Overflow(a)));
    assert_eq!(counts.get(a), Some(usize::MAX));
    assert_eq!(
        counts.add(x, 1),
        Err(CountError::Undeclared(UndeclaredMolecule(x)))
    );
    counts.add(b, 1).unwrap();
    assert_eq!(counts.checked_total(), None);
    assert_eq!(counts.total(), usize::MAX);
}

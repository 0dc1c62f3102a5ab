use crate::{DomainParameters, ECPoint, GroupError, NamedCurve};
use num_bigint::BigUint;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn hash_of(dp: &DomainParameters) -> u64 {
    let mut s = DefaultHasher::new();
    dp.hash(&mut s);
    s.finish()
}

#[test]
fn named_curves_validate() {
    for c in NamedCurve::ALL {
        let dp = c.params();
        dp.validate().unwrap();
        assert_eq!(dp.curve(), Some(c));
        assert_eq!(dp.oid(), Some(c.oid()));
        assert!(dp.is_p_3mod4());
        assert!(dp.is_point_on_curve(dp.generator()));
        assert!(dp.multiply(dp.order(), dp.generator()).unwrap().is_infinity());
    }

    let bits = NamedCurve::ALL.map(|c| (c.params().field_len(), c.params().order_len()));
    assert_eq!(bits, [(32, 32), (48, 48), (64, 64), (32, 32), (48, 48), (66, 66)]);
}

#[test]
fn order_annihilates_points() {
    for c in NamedCurve::ALL {
        let dp = c.params();
        let p = dp
            .multiply(&BigUint::from(0xdead_beefu32), dp.generator())
            .unwrap();
        assert!(dp.is_point_on_curve(&p));
        assert!(dp.multiply(dp.order(), &p).unwrap().is_infinity(), "{c}");
    }
}

#[test]
fn scalar_one_is_generator() {
    let dp = NamedCurve::BrainpoolP256r1.params();
    let one = BigUint::from(1u8);
    assert_eq!(&dp.multiply(&one, dp.generator()).unwrap(), dp.generator());
}

#[test]
fn group_law() {
    let dp = NamedCurve::Secp256r1.params();
    let g = dp.generator();

    let g2 = dp.double(g).unwrap();
    assert_eq!(dp.add(g, g).unwrap(), g2);
    let g3 = dp.add(&g2, g).unwrap();
    assert_eq!(dp.multiply(&BigUint::from(3u8), g).unwrap(), g3);
    assert_eq!(dp.add(g, &g2).unwrap(), g3);

    assert!(dp.add(g, &dp.negate(g)).unwrap().is_infinity());
    assert_eq!(&dp.add(&ECPoint::Infinity, g).unwrap(), g);
    assert_eq!(&dp.add(g, &ECPoint::Infinity).unwrap(), g);
    assert!(dp.double(&ECPoint::Infinity).unwrap().is_infinity());

    // (n-1)G = -G
    let n1 = dp.order() - 1u32;
    assert_eq!(dp.multiply(&n1, g).unwrap(), dp.negate(g));

    // 2·G + 3·G = 5·G
    let five = dp.multiply(&BigUint::from(5u8), g).unwrap();
    let mixed = dp
        .multiply_add(&BigUint::from(2u8), g, &BigUint::from(1u8), &g3)
        .unwrap();
    assert_eq!(mixed, five);
    assert!(dp
        .multiply_add(&BigUint::from(0u8), g, &BigUint::from(0u8), &g2)
        .unwrap()
        .is_infinity());
}

#[test]
fn scalar_range() {
    let dp = NamedCurve::Secp384r1.params();
    let g = dp.generator();
    assert!(matches!(
        dp.multiply(&BigUint::from(0u8), g),
        Err(GroupError::InvalidArgument(_))
    ));
    assert!(dp.multiply(&(dp.order() + 1u32), g).is_err());
    assert!(dp
        .multiply(&BigUint::from(7u8), &ECPoint::Infinity)
        .unwrap()
        .is_infinity());
}

#[test]
fn canonical_instances() {
    let named = NamedCurve::BrainpoolP384r1.params();
    let rebuilt = DomainParameters::new(
        named.p().clone(),
        named.a().clone(),
        named.b().clone(),
        named.generator().clone(),
        named.order().clone(),
        named.cofactor().clone(),
    )
    .unwrap();

    assert!(Arc::ptr_eq(&named, &rebuilt));
    assert_eq!(rebuilt.curve(), Some(NamedCurve::BrainpoolP384r1));
    assert_eq!(
        DomainParameters::from_oid("1.3.36.3.3.2.8.1.1.11").unwrap(),
        named
    );
    assert!(DomainParameters::from_oid("1.2.3.4").is_err());
    assert_ne!(*named, *NamedCurve::BrainpoolP256r1.params());
    assert_eq!(hash_of(&named), hash_of(&rebuilt));

    assert_eq!("BrainpoolP512R1".parse::<NamedCurve>(), Ok(NamedCurve::BrainpoolP512r1));
    assert_eq!("P-256".parse::<NamedCurve>(), Ok(NamedCurve::Secp256r1));
    assert!("curve25519".parse::<NamedCurve>().is_err());
}

#[test]
fn unnamed_curve() {
    // y² = x³ + x + 1 over F_23, #E = 28
    let make = |a: u32, b: u32, g: ECPoint, n: u32| {
        DomainParameters::new(
            BigUint::from(23u32),
            BigUint::from(a),
            BigUint::from(b),
            g,
            BigUint::from(n),
            BigUint::from(1u8),
        )
    };
    let g = ECPoint::new(BigUint::from(3u32), BigUint::from(10u32));

    let dp = make(1, 1, g.clone(), 28).unwrap();
    assert_eq!(dp.curve(), None);
    assert_eq!(dp.field_len(), 1);
    assert!(dp.is_p_3mod4());
    // n不是素数
    assert!(dp.validate().is_err());

    let same = make(1, 1, g.clone(), 28).unwrap();
    assert_eq!(dp, same);
    assert_eq!(hash_of(&dp), hash_of(&same));
    assert_ne!(*dp, *NamedCurve::Secp256r1.params());

    // 奇异曲线
    assert!(make(0, 0, ECPoint::new(BigUint::from(1u32), BigUint::from(1u32)), 28).is_err());
    // 基点不在曲线上
    assert!(make(1, 1, ECPoint::new(BigUint::from(3u32), BigUint::from(11u32)), 28).is_err());

    // (3, 10) + (9, 7) = (17, 20), 2·(3, 10) = (7, 12)
    let q = ECPoint::new(BigUint::from(9u32), BigUint::from(7u32));
    assert_eq!(
        dp.add(&g, &q).unwrap(),
        ECPoint::new(BigUint::from(17u32), BigUint::from(20u32))
    );
    assert_eq!(
        dp.double(&g).unwrap(),
        ECPoint::new(BigUint::from(7u32), BigUint::from(12u32))
    );
}

#[test]
fn key_agreement() {
    for c in NamedCurve::ALL {
        let dp = c.params();
        let g = dp.generator();
        let (da, db) = (BigUint::from(0x1f2e_3d4cu32), BigUint::from(0x0a0b_0c0du32));
        let (qa, qb) = (dp.multiply(&da, g).unwrap(), dp.multiply(&db, g).unwrap());

        let s1 = dp.ecka(&da, &qb).unwrap();
        let s2 = dp.ecka(&db, &qa).unwrap();
        assert_eq!(s1, s2, "{c}");
        assert_eq!(s1.len(), dp.field_len());

        let dab = &da * &db % dp.order();
        let shared = dp.multiply(&dab, g).unwrap();
        assert_eq!(s1, dp.fe2os(shared.x().unwrap()).unwrap());

        assert!(dp.ecka(&da, &ECPoint::Infinity).is_err());
        assert!(dp.ecka(dp.order(), &qb).is_err());
    }
}

//! 编译期生成的S盒及轮函数查找表
//!
//! - `TE0[i] = (2·s, s, s, 3·s)`, `s = SBOX0[i]`;
//! - `TD0[i] = (e·s, 9·s, d·s, b·s)`, `s = SBOX1[i]`;
//! - `TE1..TE3`/`TD1..TD3`依次循环右移8位;

use super::AES;

// GF(2^8)乘法, 模x⁸ + x⁴ + x³ + x + 1
const fn gf_mul(mut a: u8, mut b: u8) -> u8 {
    let mut p = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            p ^= a;
        }
        let hi = a & 0x80;
        a <<= 1;
        if hi != 0 {
            a ^= 0x1b;
        }
        b >>= 1;
    }
    p
}

// a^254 = a^{-1}, 0映射到0
const fn gf_inv(a: u8) -> u8 {
    let (mut r, mut base, mut e) = (1u8, a, 254u32);
    while e != 0 {
        if e & 1 != 0 {
            r = gf_mul(r, base);
        }
        base = gf_mul(base, base);
        e >>= 1;
    }
    r
}

const fn sbox() -> [u8; 256] {
    let mut s = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let b = gf_inv(i as u8);
        s[i] = b
            ^ b.rotate_left(1)
            ^ b.rotate_left(2)
            ^ b.rotate_left(3)
            ^ b.rotate_left(4)
            ^ 0x63;
        i += 1;
    }
    s
}

const fn inv_sbox(s: &[u8; 256]) -> [u8; 256] {
    let mut t = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        t[s[i] as usize] = i as u8;
        i += 1;
    }
    t
}

const fn te0(s: &[u8; 256]) -> [u32; 256] {
    let mut t = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let x = s[i];
        t[i] = u32::from_be_bytes([gf_mul(x, 2), x, x, gf_mul(x, 3)]);
        i += 1;
    }
    t
}

const fn td0(s: &[u8; 256]) -> [u32; 256] {
    let mut t = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let x = s[i];
        t[i] = u32::from_be_bytes([
            gf_mul(x, 0x0e),
            gf_mul(x, 0x09),
            gf_mul(x, 0x0d),
            gf_mul(x, 0x0b),
        ]);
        i += 1;
    }
    t
}

const fn rotr(t: &[u32; 256], n: u32) -> [u32; 256] {
    let mut r = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        r[i] = t[i].rotate_right(n);
        i += 1;
    }
    r
}

const fn powx() -> [u32; 16] {
    let (mut r, mut x) = ([0u32; 16], 1u8);
    let mut i = 0;
    while i < 16 {
        r[i] = (x as u32) << 24;
        x = gf_mul(x, 2);
        i += 1;
    }
    r
}

impl AES {
    pub(super) const SBOX0: [u8; 256] = sbox();
    pub(super) const SBOX1: [u8; 256] = inv_sbox(&Self::SBOX0);
    pub(super) const POWX: [u32; 16] = powx();

    pub(super) const TE0: [u32; 256] = te0(&Self::SBOX0);
    pub(super) const TE1: [u32; 256] = rotr(&Self::TE0, 8);
    pub(super) const TE2: [u32; 256] = rotr(&Self::TE0, 16);
    pub(super) const TE3: [u32; 256] = rotr(&Self::TE0, 24);

    pub(super) const TD0: [u32; 256] = td0(&Self::SBOX1);
    pub(super) const TD1: [u32; 256] = rotr(&Self::TD0, 8);
    pub(super) const TD2: [u32; 256] = rotr(&Self::TD0, 16);
    pub(super) const TD3: [u32; 256] = rotr(&Self::TD0, 24);
}

#[cfg(test)]
mod tests {
    use super::AES;

    #[test]
    fn sbox_spot_check() {
        assert_eq!(AES::SBOX0[0x00], 0x63);
        assert_eq!(AES::SBOX0[0x53], 0xed);
        assert_eq!(AES::SBOX0[0xff], 0x16);
        assert_eq!(AES::SBOX1[0x63], 0x00);
        assert_eq!(AES::TE0[0], 0xc66363a5);
        assert_eq!(AES::TD0[0], 0x51f4a750);
        assert_eq!(AES::POWX[..10], [
            0x01000000, 0x02000000, 0x04000000, 0x08000000, 0x10000000, 0x20000000, 0x40000000,
            0x80000000, 0x1b000000, 0x36000000
        ]);
    }
}

pub trait Rand {
    fn rand(&mut self, random: &mut [u8]);

    /// 返回`[0, bound)`之间均匀分布的随机数, `bound`必须大于0
    fn rand_below(&mut self, bound: u32) -> u32;

    /// random salt made of `[A-Za-z0-9]`
    fn rand_alphanumeric(&mut self, len: usize) -> String;
}

mod default_rand;
pub use default_rand::{DefaultRand, SeedRand};

impl<R: Rand + ?Sized> Rand for &mut R {
    fn rand(&mut self, random: &mut [u8]) {
        (**self).rand(random)
    }

    fn rand_below(&mut self, bound: u32) -> u32 {
        (**self).rand_below(bound)
    }

    fn rand_alphanumeric(&mut self, len: usize) -> String {
        (**self).rand_alphanumeric(len)
    }
}

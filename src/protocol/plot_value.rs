/// Anything that can be sent as the value of a scalar sample. Rendering happens before the
///  sample line is assembled, so the line format never depends on the value's type.
///
/// Floating point values are rendered with two decimal places. Send a batch (six decimal places)
///  or a pre-formatted string where more precision is needed.
pub trait PlotValue {
    fn render(&self) -> String;
}

macro_rules! impl_plot_value_integer {
    ($($t:ty),*) => {
        $(
            impl PlotValue for $t {
                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    }
}
impl_plot_value_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl PlotValue for f32 {
    fn render(&self) -> String {
        format!("{:.2}", self)
    }
}

impl PlotValue for f64 {
    fn render(&self) -> String {
        format!("{:.2}", self)
    }
}

impl PlotValue for bool {
    fn render(&self) -> String {
        (if *self { "1" } else { "0" }).to_string()
    }
}

impl PlotValue for str {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl PlotValue for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl<T: PlotValue + ?Sized> PlotValue for &T {
    fn render(&self) -> String {
        (**self).render()
    }
}

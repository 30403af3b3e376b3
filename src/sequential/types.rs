/// Which tail of the continuation region an exit probability refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegralType {
    Upper,
    Lower,
}

//! PMD is a small image smoothing library built on diffusion PDEs: the
//! linear heat equation and the edge-preserving Perona-Malik schemes.

pub mod d2;

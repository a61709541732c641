use anyhow::Result;
use async_trait::async_trait;

use crate::structs::candidate::StreamFormat;

/// External decoder the demuxer hands candidate byte ranges to.
///
/// Any error means "not this candidate": the demuxer moves on to the next one
/// and never inspects the cause. Implementations must not hold on to `data`
/// past the returned future.
#[async_trait]
pub trait DecodeCapability: Send + Sync {
    /// Decoded audio, opaque to the demuxer.
    type Output: Send;

    /// Decodes `data`. `hint` is the format whose signature matched, when the
    /// demuxer is configured to pass hints.
    async fn decode(&self, data: &[u8], hint: Option<StreamFormat>) -> Result<Self::Output>;
}

#[async_trait]
impl<T> DecodeCapability for &T
where
    T: DecodeCapability + ?Sized,
{
    type Output = T::Output;

    async fn decode(&self, data: &[u8], hint: Option<StreamFormat>) -> Result<Self::Output> {
        (**self).decode(data, hint).await
    }
}

/// Adapts a synchronous closure into a [`DecodeCapability`].
#[derive(Debug, Clone, Copy)]
pub struct FnDecoder<F>(F);

/// Wraps `f` so it can be passed wherever a [`DecodeCapability`] is expected.
pub fn decode_fn<F, T>(f: F) -> FnDecoder<F>
where
    F: Fn(&[u8], Option<StreamFormat>) -> Result<T> + Send + Sync,
    T: Send,
{
    FnDecoder(f)
}

#[async_trait]
impl<F, T> DecodeCapability for FnDecoder<F>
where
    F: Fn(&[u8], Option<StreamFormat>) -> Result<T> + Send + Sync,
    T: Send,
{
    type Output = T;

    async fn decode(&self, data: &[u8], hint: Option<StreamFormat>) -> Result<T> {
        (self.0)(data, hint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn decode_flac<C: DecodeCapability>(capability: C, data: &[u8]) -> Result<C::Output> {
        capability.decode(data, Some(StreamFormat::Flac)).await
    }

    #[tokio::test]
    async fn closure_by_reference() -> Result<()> {
        let decoder = decode_fn(|data: &[u8], hint| Ok((data.to_vec(), hint)));

        let (bytes, hint) = decode_flac(&decoder, b"fLaC").await?;
        assert_eq!(bytes, b"fLaC");
        assert_eq!(hint, Some(StreamFormat::Flac));

        let (bytes, _) = decode_flac(decoder, b"").await?;
        assert!(bytes.is_empty());
        Ok(())
    }
}

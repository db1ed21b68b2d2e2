//! MP3 to WAV transcoding
//!
//! Browsers play 16-bit PCM WAV everywhere; the TTS endpoint hands back MP3.

use super::TtsError;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Interleaved 16-bit PCM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm {
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

/// Decode MP3 bytes and re-encode them as a WAV file
pub fn mp3_to_wav(mp3: &[u8]) -> Result<Vec<u8>, TtsError> {
    let pcm = decode_mp3(mp3)?;
    encode_wav(&pcm)
}

/// Decode an MP3 stream into interleaved PCM
pub fn decode_mp3(mp3: &[u8]) -> Result<Pcm, TtsError> {
    let source = Cursor::new(mp3.to_vec());
    let mss = MediaSourceStream::new(Box::new(source), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TtsError::decode(format!("Unrecognized audio stream: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TtsError::decode("No supported audio tracks found"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TtsError::decode(format!("Unsupported codec: {e}")))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i16>> = None;
    let mut channels = 0u16;
    let mut sample_rate = 0u32;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(TtsError::decode(format!("Failed to read packet: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let needed = decoded.capacity() * spec.channels.count();
                if sample_buf.as_ref().map_or(true, |b| b.capacity() < needed) {
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                channels = u16::try_from(spec.channels.count())
                    .map_err(|_| TtsError::decode("Too many channels"))?;
                sample_rate = spec.rate;

                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            // A corrupt frame is skipped, the rest of the stream is still usable
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::debug!(error = %e, "Skipping undecodable MP3 frame");
            }
            Err(e) => return Err(TtsError::decode(format!("Decode failed: {e}"))),
        }
    }

    if samples.is_empty() || channels == 0 {
        return Err(TtsError::decode("No audio frames decoded"));
    }

    Ok(Pcm {
        samples,
        channels,
        sample_rate,
    })
}

/// Write PCM as a 16-bit WAV file
pub fn encode_wav(pcm: &Pcm) -> Result<Vec<u8>, TtsError> {
    let spec = hound::WavSpec {
        channels: pcm.channels,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| TtsError::decode(format!("Failed to create wav writer: {e}")))?;
        for &sample in &pcm.samples {
            writer
                .write_sample(sample)
                .map_err(|e| TtsError::decode(format!("Failed to write wav sample: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| TtsError::decode(format!("Failed to finalize wav: {e}")))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::TtsErrorKind;

    #[test]
    fn test_encode_wav_header_and_samples() {
        let pcm = Pcm {
            samples: vec![0, 1000, -1000, i16::MAX, i16::MIN, 0],
            channels: 2,
            sample_rate: 24_000,
        };
        let wav = encode_wav(&pcm).unwrap();

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");

        let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 24_000);
        assert_eq!(spec.bits_per_sample, 16);

        let read: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
        assert_eq!(read, pcm.samples);
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = mp3_to_wav(b"definitely not an mp3 stream").unwrap_err();
        assert_eq!(err.kind, TtsErrorKind::Decode);
    }

    #[test]
    fn test_empty_input_is_decode_error() {
        let err = mp3_to_wav(&[]).unwrap_err();
        assert_eq!(err.kind, TtsErrorKind::Decode);
    }
}
